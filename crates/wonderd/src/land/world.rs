use std::sync::{Arc, Mutex, MutexGuard};

use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use wonder_proto::{
    EventKind, InfoKind, MAX_LAND_SPRITES, PlantRequest, PlantResponse, StreamItem,
};

use super::{
    Direction, EventFanout, EventQueue, LAND_TARGET, PlantKind, Point, Sprite, SpriteAdd,
    SpriteJump, SpriteKind, SpriteMove, Tile, World, WorldError,
};

/// Name of the human that chases the Rabbit.
pub const ALICE: &str = "Alice";
/// Name of the animal that jumps around.
pub const RABBIT: &str = "Rabbit";
/// Ticks between two Rabbit jumps.
pub const RABBIT_JUMP_PERIOD: u64 = 25;
/// Most sprites a land holds, Alice and the Rabbit included.
pub const MAX_SPRITES: usize = MAX_LAND_SPRITES;

#[derive(Debug)]
struct LandState {
    tiles: Vec<Vec<Tile>>,
    sprites: Vec<Sprite>,
    rng: StdRng,
    ticks: u64,
}

impl LandState {
    fn random_point(&mut self, rows: u16, cols: u16) -> Point {
        Point::new(self.rng.random_range(0..cols), self.rng.random_range(0..rows))
    }

    fn position_of(&self, kind: SpriteKind, name: &str) -> Option<usize> {
        self.sprites
            .iter()
            .position(|sprite| sprite.is_named(kind, name))
    }

    fn jump_rabbit(&mut self, rows: u16, cols: u16) -> Option<SpriteJump> {
        let index = self.position_of(SpriteKind::Animal, RABBIT)?;
        let point = self.random_point(rows, cols);
        let rabbit = self.sprites.get_mut(index)?;
        rabbit.point = point;
        Some(SpriteJump {
            name: RABBIT.to_owned(),
            x: point.x,
            y: point.y,
        })
    }

    fn step_alice(&mut self) -> Option<SpriteMove> {
        let alice = self.position_of(SpriteKind::Human, ALICE)?;
        let rabbit = self.position_of(SpriteKind::Animal, RABBIT)?;
        let from = self.sprites.get(alice)?.point;
        let to = self.sprites.get(rabbit)?.point;

        let mut directions = Vec::with_capacity(2);
        if from.x > to.x {
            directions.push(Direction::Left);
        } else if from.x < to.x {
            directions.push(Direction::Right);
        }
        if from.y > to.y {
            directions.push(Direction::Up);
        } else if from.y < to.y {
            directions.push(Direction::Down);
        }
        if directions.is_empty() {
            return None;
        }
        let direction = *directions.get(self.rng.random_range(0..directions.len()))?;
        self.sprites.get_mut(alice)?.point = from.step(direction);
        Some(SpriteMove {
            name: ALICE.to_owned(),
            direction,
        })
    }
}

/// Tile grid plus sprites, shared by every connection of a land daemon.
#[derive(Debug)]
pub struct Land {
    rows: u16,
    cols: u16,
    state: Mutex<LandState>,
    events: EventFanout,
}

impl Land {
    /// Builds a land of random tiles without sprites.
    ///
    /// Dimensions below one are raised to one.
    #[must_use]
    pub fn new(rows: u16, cols: u16, mut rng: StdRng) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let tiles = (0..rows)
            .map(|_| {
                (0..cols)
                    .map(|_| Tile {
                        gradient: rng.random_range(0..=1),
                    })
                    .collect()
            })
            .collect();
        Self {
            rows,
            cols,
            state: Mutex::new(LandState {
                tiles,
                sprites: Vec::new(),
                rng,
                ticks: 0,
            }),
            events: EventFanout::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LandState> {
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Land dimensions as `(rows, cols)`.
    #[must_use]
    pub const fn size(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    /// Places Alice and the Rabbit at random points.
    pub fn populate(&self) {
        let mut state = self.lock();
        let alice = state.random_point(self.rows, self.cols);
        let rabbit = state.random_point(self.rows, self.cols);
        state
            .sprites
            .push(Sprite::named(SpriteKind::Human, ALICE, alice));
        state
            .sprites
            .push(Sprite::named(SpriteKind::Animal, RABBIT, rabbit));
        info!(target: LAND_TARGET, rows = self.rows, cols = self.cols, "land populated");
    }

    /// Places `sprite` where it says, bypassing the random source.
    pub fn place(&self, sprite: Sprite) {
        self.lock().sprites.push(sprite);
    }

    /// Advances the simulation one step and publishes what happened.
    ///
    /// Every [`RABBIT_JUMP_PERIOD`] ticks the Rabbit jumps to a random point.
    /// On every tick Alice takes one step towards the Rabbit unless they
    /// already share a tile. Returns the number of events published.
    ///
    /// # Errors
    ///
    /// Fails when an event payload cannot be encoded.
    pub fn tick(&self) -> Result<usize, WorldError> {
        let mut items = Vec::with_capacity(2);
        {
            let mut state = self.lock();
            state.ticks += 1;
            let jump_due = state.ticks % RABBIT_JUMP_PERIOD == 0;
            if let Some(jump) = jump_due
                .then(|| state.jump_rabbit(self.rows, self.cols))
                .flatten()
            {
                items.push(StreamItem::json(EventKind::Jump.as_str(), &jump)?);
            }
            if let Some(step) = state.step_alice() {
                items.push(StreamItem::json(EventKind::Move.as_str(), &step)?);
            }
        }
        for item in &items {
            self.events.publish(item);
        }
        Ok(items.len())
    }

    fn plant_kind(request: &PlantRequest) -> Result<PlantKind, WorldError> {
        request
            .what
            .parse()
            .map_err(|_| WorldError::UnknownPlant {
                what: request.what.clone(),
            })
    }
}

impl World for Land {
    fn plant(&self, request: &PlantRequest) -> Result<PlantResponse, WorldError> {
        let kind = Self::plant_kind(request)?;
        let mut added = Vec::new();
        {
            let mut state = self.lock();
            let present = state.sprites.len();
            let requested = usize::try_from(request.number).unwrap_or(usize::MAX);
            if requested > MAX_SPRITES.saturating_sub(present) {
                return Err(WorldError::Overcrowded {
                    requested: request.number,
                    present,
                    limit: MAX_SPRITES,
                });
            }
            added.reserve(requested);
            for _ in 0..request.number {
                let point = state.random_point(self.rows, self.cols);
                let sprite = Sprite::planted(kind, &request.color, point);
                let event = SpriteAdd {
                    kind: kind.into(),
                    sprite: &sprite,
                };
                added.push(StreamItem::json(EventKind::Add.as_str(), &event)?);
                state.sprites.push(sprite);
            }
        }
        for item in &added {
            self.events.publish(item);
        }
        debug!(target: LAND_TARGET, what = %kind, number = request.number, "planted");
        Ok(PlantResponse {
            succeeded: request.number,
            failed: 0,
        })
    }

    fn snapshot(&self) -> Result<Vec<StreamItem>, WorldError> {
        let state = self.lock();
        let mut items = Vec::with_capacity(state.sprites.len() + 2);
        items.push(StreamItem::json(InfoKind::Tiles.as_str(), &state.tiles)?);
        for sprite in &state.sprites {
            items.push(StreamItem::json(sprite.kind.info_kind().as_str(), sprite)?);
        }
        items.push(StreamItem::done());
        Ok(items)
    }

    fn subscribe(&self) -> Arc<EventQueue> {
        self.events.subscribe()
    }
}
