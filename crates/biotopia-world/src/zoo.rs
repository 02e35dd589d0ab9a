//! Population stepper: advances the whole ecosystem one tick at a time.

use crate::ancestor::ancestor;
use crate::creature::{Creature, CreatureData};
use crate::multiset::MultiSet;
use crate::mutation::Mutator;
use biotopia_core::{
    Coord, EnergyConfig, PopulationStats, Result, SimulationConfig, Summary, WorldConfig,
    WorldSize,
};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, instrument, trace, warn};

/// Stable handle of a live creature. Two creatures with identical bodies
/// are still distinct entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CreatureId(pub u64);

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub births: u64,
    pub deaths: u64,
    pub food_eaten: u64,
    pub keys_used: u64,
    pub food_deposited: u64,
    pub keys_deposited: u64,
}

/// A complete simulation: the live creatures plus the food and key particles
/// they compete for.
pub struct Zoo {
    creatures: BTreeMap<CreatureId, Creature>,
    food: MultiSet,
    keys: MultiSet,
    world: WorldConfig,
    energy: EnergyConfig,
    mutator: Mutator,
    rng: ChaCha8Rng,
    tick: u64,
    next_id: u64,
    stats_interval: u64,
}

impl Zoo {
    /// Build a full simulation from configuration: a seeded RNG,
    /// `start_population` ancestors at random positions and a random
    /// particle field.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let size = config.world.size();

        let mut ancestors = Vec::with_capacity(config.start_population);
        for _ in 0..config.start_population {
            let position = random_position(size, &mut rng);
            ancestors.push(ancestor(position, config.energy.ancestor_energy, &mut rng)?);
        }

        Self::new(ancestors, config, rng)
    }

    /// Create a zoo with the given creatures and `start_food`/`start_keys`
    /// particles on distinct random coordinates. No coordinate holds both
    /// food and a key.
    pub fn new(
        creatures: impl IntoIterator<Item = Creature>,
        config: &SimulationConfig,
        mut rng: ChaCha8Rng,
    ) -> Result<Self> {
        config.validate()?;
        let size = config.world.size();

        let food = scatter(config.world.start_food, size, &MultiSet::new(), &mut rng);
        let keys = scatter(config.world.start_keys, size, &food, &mut rng);

        Ok(Self::with_particles(creatures, config, food, keys, rng))
    }

    /// Create a zoo with an explicit particle field
    pub fn with_particles(
        creatures: impl IntoIterator<Item = Creature>,
        config: &SimulationConfig,
        food: MultiSet,
        keys: MultiSet,
        rng: ChaCha8Rng,
    ) -> Self {
        let mut zoo = Self {
            creatures: BTreeMap::new(),
            food,
            keys,
            world: config.world.clone(),
            energy: config.energy.clone(),
            mutator: Mutator::new(config.rules.clone()),
            rng,
            tick: 0,
            next_id: 0,
            stats_interval: config.stats_interval.max(1),
        };

        for creature in creatures {
            zoo.insert(creature);
        }

        zoo
    }

    /// Add a creature to the live population
    pub fn insert(&mut self, creature: Creature) -> CreatureId {
        let id = self.allocate_id();
        self.creatures.insert(id, creature);
        id
    }

    pub fn creatures(&self) -> impl Iterator<Item = (CreatureId, &Creature)> + '_ {
        self.creatures.iter().map(|(id, creature)| (*id, creature))
    }

    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.get(&id)
    }

    pub fn population(&self) -> usize {
        self.creatures.len()
    }

    pub fn food(&self) -> &MultiSet {
        &self.food
    }

    pub fn keys(&self) -> &MultiSet {
        &self.keys
    }

    /// Number of ticks completed so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn size(&self) -> WorldSize {
        self.world.size()
    }

    /// Serializable view of every live creature, in id order
    pub fn snapshot(&self) -> Vec<CreatureData> {
        self.creatures.values().map(CreatureData::from).collect()
    }

    /// Creature whose position is closest to `point`
    pub fn nearest(&self, point: Coord) -> Option<(CreatureId, &Creature)> {
        self.creatures()
            .min_by_key(|(_, creature)| creature.position.distance_squared(&point))
    }

    pub fn stats(&self) -> PopulationStats {
        let creatures = || self.creatures.values();
        PopulationStats {
            tick: self.tick,
            population: self.creatures.len(),
            total_food: self.food.total(),
            total_keys: self.keys.total(),
            age: Summary::of(creatures().map(|c| c.age as i64)),
            mouths: Summary::of(creatures().map(|c| c.mouths().len() as i64)),
            energy: Summary::of(creatures().map(|c| c.energy as i64)),
        }
    }

    /// Run for up to `ticks` ticks, stopping early if the population dies out
    #[instrument(skip(self), fields(start_tick = self.tick))]
    pub fn run(&mut self, ticks: u64) -> Result<PopulationStats> {
        info!(
            "Starting simulation for {} ticks with {} creatures",
            ticks,
            self.creatures.len()
        );

        for _ in 0..ticks {
            self.step()?;

            if self.tick % self.stats_interval == 0 {
                self.emit_population_metrics();
            }

            if self.creatures.is_empty() {
                warn!(tick = self.tick, "Population extinct");
                break;
            }
        }

        Ok(self.stats())
    }

    fn emit_population_metrics(&self) {
        let stats = self.stats();
        info!(
            event = "population_metrics",
            tick = stats.tick,
            population = stats.population,
            total_food = stats.total_food,
            total_keys = stats.total_keys,
            min_age = stats.age.min,
            avg_age = format!("{:.2}", stats.age.mean),
            max_age = stats.age.max,
            min_mouths = stats.mouths.min,
            avg_mouths = format!("{:.2}", stats.mouths.mean),
            max_mouths = stats.mouths.max,
            min_energy = stats.energy.min,
            avg_energy = format!("{:.2}", stats.energy.mean),
            max_energy = stats.energy.max,
            "Population metrics snapshot"
        );
    }

    /// Advance every creature by one tick.
    ///
    /// Creatures are processed in a shuffled order. Each loses energy and
    /// ages, feeds and breeds through its mouths, moves, and dies if its
    /// energy went negative. Newborns join the next tick's population
    /// directly and are not processed until then.
    ///
    /// An error means a creature body broke its tree invariants. The tick is
    /// aborted with every creature handled so far put back as it stood, and
    /// the zoo must not be stepped again.
    pub fn step(&mut self) -> Result<TickReport> {
        let mut report = TickReport {
            tick: self.tick,
            ..Default::default()
        };

        let mut ids: Vec<CreatureId> = self.creatures.keys().copied().collect();
        ids.shuffle(&mut self.rng);

        let mut survivors = BTreeMap::new();

        for id in ids {
            let Some(mut creature) = self.creatures.remove(&id) else {
                continue;
            };

            if let Err(e) = self.advance(id, &mut creature, &mut survivors, &mut report) {
                self.creatures.insert(id, creature);
                self.creatures.append(&mut survivors);
                return Err(e);
            }

            if creature.is_alive() {
                survivors.insert(id, creature);
            } else {
                self.bury(id, &creature, &mut report);
            }
        }

        self.creatures = survivors;
        self.tick += 1;
        Ok(report)
    }

    fn advance(
        &mut self,
        id: CreatureId,
        creature: &mut Creature,
        survivors: &mut BTreeMap<CreatureId, Creature>,
        report: &mut TickReport,
    ) -> Result<()> {
        creature.energy = creature.energy.saturating_sub(self.energy.energy_loss);
        creature.age += 1;

        self.feed(id, creature, survivors, report)?;
        self.move_creature(id, creature)
    }

    fn feed(
        &mut self,
        id: CreatureId,
        creature: &mut Creature,
        survivors: &mut BTreeMap<CreatureId, Creature>,
        report: &mut TickReport,
    ) -> Result<()> {
        let mouths: Vec<Coord> = creature.absolute_mouths().collect();

        for mouth in mouths {
            if self.food.remove(mouth) {
                creature.energy = creature.energy.saturating_add(self.energy.energy_gain);
                report.food_eaten += 1;
                trace!(creature = %id, x = mouth.x, y = mouth.y, "Ate food");
            }

            if self.keys.remove(mouth) {
                report.keys_used += 1;
                let offspring = self.breed(creature, mouth)?;
                let offspring_id = self.allocate_id();
                debug!(
                    parent = %id,
                    offspring = %offspring_id,
                    cells = offspring.len(),
                    x = mouth.x,
                    y = mouth.y,
                    tick = self.tick,
                    "Creature reproduced"
                );
                survivors.insert(offspring_id, offspring);
                report.births += 1;
            }
        }

        Ok(())
    }

    /// Copy the parent's body onto `at`, maybe mutate it, and turn it left or
    /// right at random.
    fn breed(&mut self, parent: &Creature, at: Coord) -> Result<Creature> {
        let mut offspring = Creature::new(
            at,
            parent.cells().iter().copied(),
            parent.head(),
            self.energy.offspring_energy,
        )?;

        if self.mutator.should_mutate(&mut self.rng) {
            let kind = self.mutator.mutate(&mut offspring, &mut self.rng)?;
            debug!(?kind, cells = offspring.len(), "Offspring mutated");
        }

        if self.rng.gen_bool(0.5) {
            offspring.rotate_left()?;
        } else {
            offspring.rotate_right()?;
        }

        Ok(offspring)
    }

    /// Take the next step of the creature's movement cycle, then wrap or
    /// bounce off each world edge independently.
    fn move_creature(&self, id: CreatureId, creature: &mut Creature) -> Result<()> {
        let step = creature.next_step();
        creature.position = creature.position + step;

        let size = self.world.size();

        if creature.position.x < 0 || creature.position.x > size.width {
            if self.world.wrap_horizontal {
                creature.position.x += if creature.position.x < 0 {
                    size.width
                } else {
                    -size.width
                };
            } else {
                creature.position.x = creature.position.x.clamp(0, size.width);
                creature.mirror_horizontal()?;
                debug!(creature = %id, x = creature.position.x, "Bounced off vertical edge");
            }
        }

        if creature.position.y < 0 || creature.position.y > size.height {
            if self.world.wrap_vertical {
                creature.position.y += if creature.position.y < 0 {
                    size.height
                } else {
                    -size.height
                };
            } else {
                creature.position.y = creature.position.y.clamp(0, size.height);
                creature.mirror_vertical()?;
                debug!(creature = %id, y = creature.position.y, "Bounced off horizontal edge");
            }
        }

        Ok(())
    }

    /// Turn a dead creature into particles: a key where its head was and
    /// food on every other cell.
    fn bury(&mut self, id: CreatureId, creature: &Creature, report: &mut TickReport) {
        for cell in creature.cells() {
            let at = creature.position + *cell;
            if *cell == creature.head() {
                self.keys.add(at);
                report.keys_deposited += 1;
            } else {
                self.food.add(at);
                report.food_deposited += 1;
            }
        }

        report.deaths += 1;
        debug!(
            creature = %id,
            age = creature.age,
            cells = creature.len(),
            tick = self.tick,
            "Creature died"
        );
    }

    fn allocate_id(&mut self) -> CreatureId {
        let id = CreatureId(self.next_id);
        self.next_id += 1;
        id
    }
}

fn random_position(size: WorldSize, rng: &mut ChaCha8Rng) -> Coord {
    Coord::new(rng.gen_range(0..=size.width), rng.gen_range(0..=size.height))
}

/// Place `count` particles on distinct coordinates not occupied in `avoid`
fn scatter(count: usize, size: WorldSize, avoid: &MultiSet, rng: &mut ChaCha8Rng) -> MultiSet {
    let mut particles = MultiSet::new();
    while particles.unique_len() < count {
        let pos = random_position(size, rng);
        if !particles.contains(pos) && !avoid.contains(pos) {
            particles.add(pos);
        }
    }
    particles
}
