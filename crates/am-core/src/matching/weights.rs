/// Interest-leaning weights, used when the pair wrote more about their
/// interests than their personality.
pub const INTEREST_LEANING: Weights = Weights {
    interests: 0.45,
    emotional: 0.30,
    practical: 0.25,
};

/// Trait-leaning weights, used when trait text dominates the forms.
/// Personality data is rarer and more deliberate, so it earns more weight
/// when people bother to provide it.
pub const TRAIT_LEANING: Weights = Weights {
    interests: 0.30,
    emotional: 0.45,
    practical: 0.25,
};

#[derive(Debug, Clone, Copy)]
pub struct Weights {
    pub interests: f64,
    pub emotional: f64,
    pub practical: f64,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.interests + self.emotional + self.practical
    }

    /// Pick the preset matching where the pair spent their words.
    pub fn adaptive(interest_tokens: usize, trait_tokens: usize) -> Self {
        if trait_tokens.max(1) >= interest_tokens.max(1) {
            TRAIT_LEANING
        } else {
            INTEREST_LEANING
        }
    }
}
