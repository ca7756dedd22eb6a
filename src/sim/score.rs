//! Score and combo engine
//!
//! Driven purely by the resolver's outcome events. Scoring:
//! `match_points + combo_bonus * (combo - 1)` per match, where `combo`
//! counts consecutive matches and drops to 0 on any mismatch.

use serde::{Deserialize, Serialize};

use super::event::GameEvent;

/// Scoring constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Points for every matched pair
    pub match_points: u32,
    /// Extra points per consecutive match beyond the first
    pub combo_bonus: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            match_points: 1,
            combo_bonus: 2,
        }
    }
}

impl ScoringRules {
    /// Points awarded for a match at combo count `combo` (1-based)
    pub fn points_for(&self, combo: u32) -> u32 {
        self.combo_bonus
            .saturating_mul(combo.saturating_sub(1))
            .saturating_add(self.match_points)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    rules: ScoringRules,
    score: u32,
    combo: u32,
}

impl ScoreEngine {
    pub fn new(rules: ScoringRules) -> Self {
        Self {
            rules,
            score: 0,
            combo: 0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn rules(&self) -> ScoringRules {
        self.rules
    }

    /// Feed one resolver event; any resulting score events go to `out`.
    ///
    /// Each outcome must be delivered at most once.
    pub fn apply(&mut self, event: &GameEvent, out: &mut Vec<GameEvent>) {
        match event {
            GameEvent::TilesMatch { .. } => {
                self.combo = self.combo.saturating_add(1);
                let points = self.rules.points_for(self.combo);
                self.score = self.score.saturating_add(points);
                out.push(GameEvent::ScoreChanged { score: self.score });

                if self.combo >= 2 {
                    log::debug!("Combo x{} (+{} points)", self.combo, points);
                    out.push(GameEvent::ComboHit { combo: self.combo });
                }
            }
            GameEvent::TilesMismatch { .. } => {
                self.combo = 0;
            }
            _ => {}
        }
    }

    /// Zero score and combo for a fresh game
    pub fn reset(&mut self, out: &mut Vec<GameEvent>) {
        self.score = 0;
        self.combo = 0;
        out.push(GameEvent::ScoreChanged { score: 0 });
    }

    /// Restore counters from a save
    pub fn restore(&mut self, score: u32, combo: u32, out: &mut Vec<GameEvent>) {
        self.score = score;
        self.combo = combo;
        out.push(GameEvent::ScoreChanged { score });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATCH: GameEvent = GameEvent::TilesMatch {
        pairs_found: 0,
        total_pairs: 0,
    };
    const MISMATCH: GameEvent = GameEvent::TilesMismatch {
        flip_back_delay: 0.5,
    };

    #[test]
    fn test_consecutive_matches_square_scores() {
        let mut engine = ScoreEngine::new(ScoringRules::default());
        let mut out = Vec::new();
        let mut scores = Vec::new();
        for _ in 0..4 {
            engine.apply(&MATCH, &mut out);
            scores.push(engine.score());
        }
        assert_eq!(scores, vec![1, 4, 9, 16]);
        assert_eq!(engine.combo(), 4);
    }

    #[test]
    fn test_events_per_match() {
        let mut engine = ScoreEngine::new(ScoringRules::default());
        let mut out = Vec::new();

        engine.apply(&MATCH, &mut out);
        assert_eq!(out, vec![GameEvent::ScoreChanged { score: 1 }]);

        out.clear();
        engine.apply(&MATCH, &mut out);
        assert_eq!(
            out,
            vec![
                GameEvent::ScoreChanged { score: 4 },
                GameEvent::ComboHit { combo: 2 }
            ]
        );
    }

    #[test]
    fn test_mismatch_resets_combo_silently() {
        let mut engine = ScoreEngine::new(ScoringRules::default());
        let mut out = Vec::new();
        engine.apply(&MATCH, &mut out);
        engine.apply(&MATCH, &mut out);
        out.clear();

        engine.apply(&MISMATCH, &mut out);
        assert!(out.is_empty());
        assert_eq!(engine.combo(), 0);
        assert_eq!(engine.score(), 4);

        // Next match scores as combo 1
        engine.apply(&MATCH, &mut out);
        assert_eq!(engine.score(), 5);
        assert_eq!(out, vec![GameEvent::ScoreChanged { score: 5 }]);
    }

    #[test]
    fn test_custom_rules() {
        let rules = ScoringRules {
            match_points: 10,
            combo_bonus: 5,
        };
        assert_eq!(rules.points_for(1), 10);
        assert_eq!(rules.points_for(3), 20);
    }

    #[test]
    fn test_large_bonus_saturates() {
        let rules = ScoringRules {
            match_points: 1,
            combo_bonus: u32::MAX,
        };
        assert_eq!(rules.points_for(1), 1);
        assert_eq!(rules.points_for(2), u32::MAX);

        let mut engine = ScoreEngine::new(rules);
        let mut out = Vec::new();
        engine.apply(&MATCH, &mut out);
        engine.apply(&MATCH, &mut out);
        engine.apply(&MATCH, &mut out);
        assert_eq!(engine.score(), u32::MAX);
        assert_eq!(engine.combo(), 3);
    }

    #[test]
    fn test_reset_and_restore() {
        let mut engine = ScoreEngine::new(ScoringRules::default());
        let mut out = Vec::new();
        engine.restore(12, 3, &mut out);
        assert_eq!(engine.score(), 12);
        assert_eq!(engine.combo(), 3);

        engine.reset(&mut out);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.combo(), 0);
        assert_eq!(
            out,
            vec![
                GameEvent::ScoreChanged { score: 12 },
                GameEvent::ScoreChanged { score: 0 }
            ]
        );
    }

    #[test]
    fn test_ignores_other_events() {
        let mut engine = ScoreEngine::new(ScoringRules::default());
        let mut out = Vec::new();
        engine.apply(&GameEvent::TurnFinished { moves: 1 }, &mut out);
        engine.apply(&GameEvent::LevelFinished, &mut out);
        assert!(out.is_empty());
        assert_eq!(engine.score(), 0);
    }
}
