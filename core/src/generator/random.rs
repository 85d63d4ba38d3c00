use super::*;

/// Purely random mine placement driven by a seeded [`rand::rngs::SmallRng`], so a seed always
/// reproduces the same field.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomFieldGenerator {
    seed: u64,
}

impl RandomFieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl FieldGenerator for RandomFieldGenerator {
    fn generate(self, config: &GameConfig) -> Result<Field> {
        use rand::prelude::*;

        let mut field = Field::new(config)?;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        log::debug!(
            "generating {}x{} field with {} mines, seed {}",
            config.rows,
            config.columns,
            config.mines,
            self.seed
        );
        field.generate(&mut rng);
        Ok(field)
    }
}
