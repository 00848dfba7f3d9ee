use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use super::{
    action::Direction,
    config::{BoundaryMode, SpawnMode, WorldConfig},
    state::{Cell, CollisionType, Snake},
};
use crate::error::Result;

/// Rejection-sampling attempts before falling back to a scan of free cells
const SPAWN_ATTEMPTS: usize = 64;

/// Bounds of the randomized batch size in multi-apple mode
const MULTI_APPLE_MIN: usize = 2;
const MULTI_APPLE_MAX: usize = 5;

/// Information about a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepInfo {
    /// Whether the snake ate an apple this step
    pub ate_apple: bool,
    /// Type of collision if one occurred
    pub collision: Option<CollisionType>,
}

/// Deterministic snake episode state machine
///
/// The world owns the snake, the apples and its random source. Every
/// mutation goes through [`GridWorld::reset`] and [`GridWorld::step`];
/// callers read the rest through accessors.
#[derive(Debug, Clone)]
pub struct GridWorld<R = StdRng> {
    config: WorldConfig,
    snake: Snake,
    apples: Vec<Cell>,
    score: u32,
    steps: u32,
    done: bool,
    rng: R,
}

impl GridWorld<StdRng> {
    /// Create a world seeded from `config.seed`, or from the OS when unset
    pub fn new(config: WorldConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> GridWorld<R> {
    /// Create a world drawing apple positions from `rng`
    ///
    /// The world is returned already reset.
    pub fn with_rng(config: WorldConfig, rng: R) -> Result<Self> {
        config.validate()?;

        let mut world = Self {
            snake: Snake::new(Cell::new(0, 0), Direction::Right, 1),
            apples: Vec::new(),
            score: 0,
            steps: 0,
            done: false,
            config,
            rng,
        };
        world.reset();
        Ok(world)
    }

    /// Reset the game to its initial state
    pub fn reset(&mut self) {
        let center = Cell::new(
            (self.config.grid_width / 2) as i32,
            (self.config.grid_height / 2) as i32,
        );

        self.snake = Snake::new(center, Direction::Right, self.config.initial_snake_length);
        self.apples.clear();
        self.score = 0;
        self.steps = 0;
        self.done = false;
        self.spawn_batch();
    }

    /// Execute one step of the game
    ///
    /// A terminated world is left untouched.
    pub fn step(&mut self, direction: Direction) -> StepInfo {
        if self.done {
            debug!("step called on a terminated world; ignoring");
            return StepInfo::default();
        }

        self.snake.turn(direction);
        self.steps += 1;

        let mut new_head = self.snake.head().moved_in_direction(self.snake.direction);
        if !self.is_in_bounds(new_head) {
            match self.config.boundary_mode {
                BoundaryMode::Bounded => {
                    self.done = true;
                    return StepInfo {
                        ate_apple: false,
                        collision: Some(CollisionType::Wall),
                    };
                }
                BoundaryMode::Wrap => {
                    new_head = new_head.wrapped(self.config.grid_width, self.config.grid_height);
                }
            }
        }

        self.snake.advance(new_head);

        let ate_apple = self.consume_apple(new_head);

        if self.snake.collides_with_body(new_head) {
            self.done = true;
            return StepInfo {
                ate_apple,
                collision: Some(CollisionType::SelfCollision),
            };
        }

        StepInfo {
            ate_apple,
            collision: None,
        }
    }

    /// Eat the apple under the head, if any, and respawn per mode
    fn consume_apple(&mut self, head: Cell) -> bool {
        let Some(idx) = self.apples.iter().position(|&apple| apple == head) else {
            return false;
        };

        self.apples.remove(idx);
        self.score += 1;
        self.snake.grow();

        match self.config.spawn_mode {
            SpawnMode::Single => self.spawn_batch(),
            SpawnMode::Multi if self.apples.is_empty() => self.spawn_batch(),
            SpawnMode::Multi => {}
        }

        true
    }

    /// Place a fresh batch of apples according to the spawn mode
    fn spawn_batch(&mut self) {
        let count = match self.config.spawn_mode {
            SpawnMode::Single => 1,
            SpawnMode::Multi => self.rng.gen_range(MULTI_APPLE_MIN..=MULTI_APPLE_MAX),
        };

        for _ in 0..count {
            match self.random_free_cell() {
                Some(cell) => self.apples.push(cell),
                None => {
                    debug!(apples = self.apples.len(), "no free cell left for an apple");
                    break;
                }
            }
        }
    }

    /// Pick a cell holding neither the snake nor an apple
    fn random_free_cell(&mut self) -> Option<Cell> {
        let width = self.config.grid_width as i32;
        let height = self.config.grid_height as i32;

        for _ in 0..SPAWN_ATTEMPTS {
            let cell = Cell::new(self.rng.gen_range(0..width), self.rng.gen_range(0..height));
            if self.is_free(cell) {
                return Some(cell);
            }
        }

        // Crowded board: choose uniformly among what is left
        let free: Vec<Cell> = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::new(x, y)))
            .filter(|&cell| self.is_free(cell))
            .collect();

        if free.is_empty() {
            return None;
        }
        Some(free[self.rng.gen_range(0..free.len())])
    }

    fn is_free(&self, cell: Cell) -> bool {
        !self.snake.contains(cell) && !self.apples.contains(&cell)
    }

    /// Check if a cell is within the grid bounds
    pub fn is_in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0
            && cell.x < self.config.grid_width as i32
            && cell.y >= 0
            && cell.y < self.config.grid_height as i32
    }

    /// Shortest `(dx, dy)` from `from` to `to`
    ///
    /// In wrap mode the path may cross the grid edges; an offset of exactly
    /// half the grid stays positive.
    pub fn offset(&self, from: Cell, to: Cell) -> (i32, i32) {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        match self.config.boundary_mode {
            BoundaryMode::Bounded => (dx, dy),
            BoundaryMode::Wrap => (
                shortest_span(dx, self.config.grid_width as i32),
                shortest_span(dy, self.config.grid_height as i32),
            ),
        }
    }

    /// Euclidean length of [`GridWorld::offset`]
    pub fn distance(&self, from: Cell, to: Cell) -> f64 {
        let (dx, dy) = self.offset(from, to);
        Cell::new(0, 0).distance(Cell::new(dx, dy))
    }

    /// Apple closest to the head; the earliest placed wins ties
    pub fn nearest_apple(&self) -> Option<Cell> {
        let head = self.snake.head();
        self.apples.iter().copied().min_by_key(|&apple| {
            let (dx, dy) = self.offset(head, apple);
            Cell::new(0, 0).distance_sq(Cell::new(dx, dy))
        })
    }

    /// Distance from the head to the nearest apple
    pub fn nearest_apple_distance(&self) -> Option<f64> {
        let head = self.snake.head();
        self.nearest_apple().map(|apple| self.distance(head, apple))
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn apples(&self) -> &[Cell] {
        &self.apples
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Steps taken since the last reset
    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn width(&self) -> usize {
        self.config.grid_width
    }

    pub fn height(&self) -> usize {
        self.config.grid_height
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }
}

/// Reduce `delta` to the shorter way around a ring of `span` cells
fn shortest_span(delta: i32, span: i32) -> i32 {
    let forward = delta.rem_euclid(span);
    if forward * 2 > span {
        forward - span
    } else {
        forward
    }
}

#[cfg(test)]
impl<R: Rng> GridWorld<R> {
    /// Replace snake and apples to set up a scenario
    pub(crate) fn place(&mut self, snake: Snake, apples: Vec<Cell>) {
        self.snake = snake;
        self.apples = apples;
        self.done = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn seeded(config: WorldConfig) -> GridWorld {
        GridWorld::new(config.with_seed(42)).unwrap()
    }

    /// Apples always land on (0, 0), or the first free cell after it
    fn pinned(config: WorldConfig) -> GridWorld<StepRng> {
        GridWorld::with_rng(config, StepRng::new(0, 0)).unwrap()
    }

    fn assert_apples_clear_of_snake<R: Rng>(world: &GridWorld<R>) {
        for apple in world.apples() {
            assert!(!world.snake().contains(*apple), "apple {apple:?} on snake");
        }
    }

    #[test]
    fn test_reset() {
        let world = seeded(WorldConfig::default());

        assert!(!world.is_done());
        assert_eq!(world.score(), 0);
        assert_eq!(world.steps(), 0);
        assert_eq!(world.snake().len(), 1);
        assert_eq!(world.snake().head(), Cell::new(15, 15));
        assert_eq!(world.snake().direction, Direction::Right);
        assert_eq!(world.apples().len(), 1);
        assert_apples_clear_of_snake(&world);
    }

    #[test]
    fn test_reset_is_deterministic_for_a_seed() {
        let a = seeded(WorldConfig::small().with_spawn_mode(SpawnMode::Multi));
        let b = seeded(WorldConfig::small().with_spawn_mode(SpawnMode::Multi));
        assert_eq!(a.apples(), b.apples());
    }

    #[test]
    fn test_multi_apple_batch_size() {
        for seed in 0..20 {
            let world =
                GridWorld::new(WorldConfig::small().with_spawn_mode(SpawnMode::Multi).with_seed(seed))
                    .unwrap();
            let count = world.apples().len();
            assert!((MULTI_APPLE_MIN..=MULTI_APPLE_MAX).contains(&count));

            let mut unique = world.apples().to_vec();
            unique.sort_by_key(|c| (c.x, c.y));
            unique.dedup();
            assert_eq!(unique.len(), count);
        }
    }

    #[test]
    fn test_basic_movement() {
        let mut world = seeded(WorldConfig::small());
        world.place(Snake::new(Cell::new(5, 5), Direction::Right, 1), vec![Cell::new(0, 0)]);

        let info = world.step(Direction::Right);

        assert_eq!(info, StepInfo::default());
        assert_eq!(world.steps(), 1);
        assert_eq!(world.snake().head(), Cell::new(6, 5));
    }

    #[test]
    fn test_apple_consumption_grows_next_step() {
        let mut world = pinned(WorldConfig::small());
        world.place(Snake::new(Cell::new(5, 5), Direction::Right, 2), vec![Cell::new(6, 5)]);

        let info = world.step(Direction::Right);
        assert!(info.ate_apple);
        assert_eq!(world.score(), 1);
        assert_eq!(world.snake().len(), 2);
        assert_eq!(world.apples(), &[Cell::new(0, 0)]);
        assert_apples_clear_of_snake(&world);

        world.step(Direction::Up);
        assert_eq!(world.snake().len(), 3);

        world.step(Direction::Up);
        assert_eq!(world.snake().len(), 3);
    }

    #[test]
    fn test_multi_mode_refills_only_when_empty() {
        let mut world = pinned(WorldConfig::small().with_spawn_mode(SpawnMode::Multi));
        world.place(
            Snake::new(Cell::new(5, 5), Direction::Right, 1),
            vec![Cell::new(6, 5), Cell::new(7, 5)],
        );

        world.step(Direction::Right);
        assert_eq!(world.apples(), &[Cell::new(7, 5)]);

        world.step(Direction::Right);
        assert_eq!(world.score(), 2);
        assert_eq!(world.apples(), &[Cell::new(0, 0), Cell::new(1, 0)]);
        assert_apples_clear_of_snake(&world);
    }

    #[test]
    fn test_wall_collision() {
        let mut world = seeded(WorldConfig::small());
        world.place(Snake::new(Cell::new(0, 5), Direction::Left, 1), vec![Cell::new(5, 5)]);

        let info = world.step(Direction::Left);

        assert!(world.is_done());
        assert_eq!(info.collision, Some(CollisionType::Wall));
        assert_eq!(world.snake().head(), Cell::new(0, 5));
    }

    #[test]
    fn test_wrap_mode_reenters_opposite_edge() {
        let mut world = seeded(WorldConfig::small().with_boundary_mode(BoundaryMode::Wrap));
        world.place(Snake::new(Cell::new(0, 5), Direction::Left, 1), vec![Cell::new(5, 5)]);

        let info = world.step(Direction::Left);

        assert!(!world.is_done());
        assert_eq!(info.collision, None);
        assert_eq!(world.snake().head(), Cell::new(9, 5));
    }

    #[test]
    fn test_self_collision() {
        let mut world = seeded(WorldConfig::small());
        world.place(Snake::new(Cell::new(5, 5), Direction::Right, 5), vec![Cell::new(9, 9)]);

        // (6,5) (6,6) (5,6) then up into (5,5), still occupied by the body
        world.step(Direction::Right);
        world.step(Direction::Down);
        world.step(Direction::Left);
        let info = world.step(Direction::Up);

        assert!(world.is_done());
        assert_eq!(info.collision, Some(CollisionType::SelfCollision));
    }

    #[test]
    fn test_moving_into_vacated_tail_is_safe() {
        let mut world = seeded(WorldConfig::small());
        world.place(Snake::new(Cell::new(5, 5), Direction::Right, 4), vec![Cell::new(9, 9)]);

        // A length-4 snake circling a 2x2 square chases its own tail
        for direction in [Direction::Down, Direction::Left, Direction::Up, Direction::Right] {
            let info = world.step(direction);
            assert_eq!(info.collision, None);
        }
        assert!(!world.is_done());
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let mut world = seeded(WorldConfig::small());
        world.place(Snake::new(Cell::new(5, 5), Direction::Right, 1), vec![Cell::new(0, 0)]);

        world.step(Direction::Left);

        assert_eq!(world.snake().direction, Direction::Right);
        assert_eq!(world.snake().head(), Cell::new(6, 5));
    }

    #[test]
    fn test_terminated_game_no_update() {
        let mut world = seeded(WorldConfig::small());
        world.place(Snake::new(Cell::new(0, 5), Direction::Left, 1), vec![Cell::new(5, 5)]);
        world.step(Direction::Left);
        assert!(world.is_done());

        let snake = world.snake().clone();
        let apples = world.apples().to_vec();
        let steps = world.steps();

        let info = world.step(Direction::Up);

        assert_eq!(info, StepInfo::default());
        assert_eq!(world.snake(), &snake);
        assert_eq!(world.apples(), apples.as_slice());
        assert_eq!(world.steps(), steps);
    }

    #[test]
    fn test_crowded_board_falls_back_to_free_cells() {
        // StepRng(0, 0) always samples (0, 0); the head sits there, so the
        // apple must come from the scan
        let config = WorldConfig::new(2, 2);
        let mut world = GridWorld::with_rng(config, StepRng::new(0, 0)).unwrap();
        assert_eq!(world.snake().head(), Cell::new(1, 1));
        assert_eq!(world.apples(), &[Cell::new(0, 0)]);

        world.place(Snake::new(Cell::new(0, 0), Direction::Right, 1), vec![]);
        let cell = world.random_free_cell();
        assert_eq!(cell, Some(Cell::new(1, 0)));
    }

    #[test]
    fn test_full_board_spawns_nothing() {
        let mut world = GridWorld::with_rng(WorldConfig::new(2, 2), StepRng::new(0, 0)).unwrap();
        world.place(Snake::new(Cell::new(1, 0), Direction::Right, 2), vec![]);
        world.apples = vec![Cell::new(0, 1), Cell::new(1, 1)];
        assert_eq!(world.random_free_cell(), None);
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(GridWorld::new(WorldConfig::new(1, 1)).is_err());
    }

    #[test]
    fn test_nearest_apple_prefers_first_on_tie() {
        let mut world = seeded(WorldConfig::small());
        world.place(
            Snake::new(Cell::new(5, 5), Direction::Right, 1),
            vec![Cell::new(5, 8), Cell::new(2, 5), Cell::new(5, 2)],
        );
        assert_eq!(world.nearest_apple(), Some(Cell::new(5, 8)));
    }

    #[test]
    fn test_wrap_distance_crosses_edges() {
        let mut world = seeded(WorldConfig::small().with_boundary_mode(BoundaryMode::Wrap));
        world.place(
            Snake::new(Cell::new(0, 5), Direction::Right, 1),
            vec![Cell::new(6, 5), Cell::new(9, 5)],
        );

        assert_eq!(world.offset(Cell::new(0, 5), Cell::new(9, 5)), (-1, 0));
        assert_eq!(world.offset(Cell::new(5, 9), Cell::new(5, 0)), (0, 1));
        assert_eq!(world.offset(Cell::new(0, 0), Cell::new(5, 5)), (5, 5));
        assert_eq!(world.nearest_apple(), Some(Cell::new(9, 5)));
        assert_eq!(world.nearest_apple_distance(), Some(1.0));
    }

    #[test]
    fn test_bounded_distance_is_plain() {
        let mut world = seeded(WorldConfig::small());
        world.place(
            Snake::new(Cell::new(0, 5), Direction::Right, 1),
            vec![Cell::new(6, 5), Cell::new(9, 5)],
        );

        assert_eq!(world.offset(Cell::new(0, 5), Cell::new(9, 5)), (9, 0));
        assert_eq!(world.nearest_apple(), Some(Cell::new(6, 5)));
        assert_eq!(world.nearest_apple_distance(), Some(6.0));
    }
}
