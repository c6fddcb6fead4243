use rand::Rng;
use selection_diagnostics::{
    Diagnostic, DiagnosticKind, DiagnosticWorld, Evaluation, Evaluator, Evolver,
    GaussianMutation, OrganismError, ScoreSnapshot, SelectionError, Selector, WorldError,
    algorithms::{
        EpsilonLexicase, FitnessSharing, MuLambda, NoveltySearch, SelectionScheme, Tournament,
    },
};
use std::sync::atomic::{AtomicUsize, Ordering};

// --- Mock Infrastructure ---

/// Exploitation landscape that counts how often it is asked to evaluate.
struct CountingEval {
    inner: Diagnostic,
    calls: AtomicUsize,
}

impl CountingEval {
    fn new() -> Self {
        Self {
            inner: Diagnostic::new(DiagnosticKind::Exploitation, 10.0, 0.0, 0.5).unwrap(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Evaluator for CountingEval {
    fn evaluate(&self, genome: &[f64]) -> Result<Evaluation, OrganismError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.evaluate(genome)
    }
}

/// Always picks slot 0.
struct FirstSlot;

impl Selector for FirstSlot {
    fn select<R: Rng + ?Sized>(
        &self,
        snapshot: &ScoreSnapshot,
        _rng: &mut R,
    ) -> Result<Vec<usize>, SelectionError> {
        Ok(vec![0; snapshot.len()])
    }

    fn validate(&self, _population_size: usize) -> Result<(), SelectionError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "first slot"
    }
}

/// Returns one parent too few.
struct ShortSelector;

impl Selector for ShortSelector {
    fn select<R: Rng + ?Sized>(
        &self,
        snapshot: &ScoreSnapshot,
        _rng: &mut R,
    ) -> Result<Vec<usize>, SelectionError> {
        Ok(vec![0; snapshot.len() - 1])
    }

    fn validate(&self, _population_size: usize) -> Result<(), SelectionError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "short"
    }
}

fn exploitation() -> Diagnostic {
    Diagnostic::new(DiagnosticKind::Exploitation, 10.0, 0.0, 0.5).unwrap()
}

fn mutation(rate: f64) -> GaussianMutation {
    GaussianMutation::new(rate, 0.0, 1.0, 10.0).unwrap()
}

fn all_schemes(pop: usize) -> Vec<SelectionScheme> {
    vec![
        SelectionScheme::MuLambda(MuLambda::new(pop / 4)),
        SelectionScheme::Tournament(Tournament::new(4)),
        SelectionScheme::FitnessSharing(FitnessSharing {
            tournament_size: 4,
            ..Default::default()
        }),
        SelectionScheme::NoveltySearch(NoveltySearch {
            tournament_size: 4,
            k: 5,
            ..Default::default()
        }),
        SelectionScheme::EpsilonLexicase(EpsilonLexicase::new(0.0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_scheme_runs_on_every_diagnostic() {
        for kind in [
            DiagnosticKind::Exploitation,
            DiagnosticKind::StructuredExploitation,
            DiagnosticKind::ContraEcology,
            DiagnosticKind::Exploration,
        ] {
            for scheme in all_schemes(20) {
                let name = scheme.name();
                let diagnostic = Diagnostic::new(kind, 10.0, 0.0, 0.5).unwrap();
                let mut world =
                    DiagnosticWorld::new(diagnostic, scheme, mutation(0.2), 20, 5, 42).unwrap();
                let history = world
                    .run(10)
                    .unwrap_or_else(|e| panic!("{name} on {}: {e}", kind.name()));
                assert_eq!(history.len(), 10);
                assert_eq!(world.generation(), 10);
                assert_eq!(world.population().len(), 20);
            }
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let make = || {
            DiagnosticWorld::new(
                exploitation(),
                SelectionScheme::EpsilonLexicase(EpsilonLexicase::new(0.1)),
                mutation(0.3),
                16,
                4,
                7,
            )
            .unwrap()
        };
        let mut a = make();
        let mut b = make();
        assert_eq!(a.run(25).unwrap(), b.run(25).unwrap());
        assert_eq!(a.population(), b.population());
    }

    #[test]
    fn test_genes_stay_within_bounds() {
        let mut world = DiagnosticWorld::new(
            exploitation(),
            SelectionScheme::Tournament(Tournament::new(2)),
            GaussianMutation::new(0.5, 1.0, 3.0, 10.0).unwrap(),
            30,
            6,
            3,
        )
        .unwrap();
        world.run(40).unwrap();
        for org in world.population() {
            assert!(org.genome().iter().all(|&g| (0.0..=10.0).contains(&g)));
        }
    }

    #[test]
    fn test_elitist_selection_makes_progress() {
        let mut world = DiagnosticWorld::new(
            exploitation(),
            SelectionScheme::MuLambda(MuLambda::new(5)),
            mutation(0.5),
            20,
            4,
            11,
        )
        .unwrap();
        let history = world.run(100).unwrap();
        assert_eq!(history[0].best_aggregate, 0.0);
        assert!(
            history[99].best_aggregate > 10.0,
            "no progress: {:?}",
            history[99]
        );
    }

    #[test]
    fn test_unmutated_clones_inherit_instead_of_reevaluating() {
        let mut world = DiagnosticWorld::new(
            CountingEval::new(),
            SelectionScheme::Tournament(Tournament::new(3)),
            mutation(0.0),
            10,
            3,
            1,
        )
        .unwrap();
        let history = world.run(8).unwrap();

        assert_eq!(world.evaluator().calls.load(Ordering::SeqCst), 10);
        assert_eq!(history[0].evaluated, 10);
        assert!(history[1..].iter().all(|s| s.evaluated == 0));
        assert!(world.population().iter().all(|o| o.is_scored()));
    }

    #[test]
    fn test_mutated_offspring_are_reevaluated() {
        let mut world = DiagnosticWorld::new(
            CountingEval::new(),
            SelectionScheme::Tournament(Tournament::new(3)),
            mutation(1.0),
            10,
            3,
            1,
        )
        .unwrap();
        let history = world.run(5).unwrap();

        assert!(history.iter().all(|s| s.evaluated == 10));
        assert_eq!(world.evaluator().calls.load(Ordering::SeqCst), 50);
        assert!(world.population().iter().all(|o| !o.is_scored()));
    }

    #[test]
    fn test_injected_selector_controls_parentage() {
        let mut world =
            DiagnosticWorld::new(exploitation(), FirstSlot, mutation(0.0), 6, 2, 5).unwrap();
        world.evaluation_step().unwrap();
        let parents = world.selection_step().unwrap();
        assert_eq!(parents, vec![0; 6]);
        world.reproduction_step(&parents).unwrap();

        let first = world.population()[0].clone();
        assert!(world.population().iter().all(|o| *o == first));
    }

    #[test]
    fn test_selection_step_with_debug_logging_enabled() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
        let mut world =
            DiagnosticWorld::new(exploitation(), FirstSlot, mutation(0.5), 5, 2, 8).unwrap();
        world.evaluation_step().unwrap();
        assert_eq!(world.selection_step().unwrap(), vec![0; 5]);
        assert_eq!(world.run(3).unwrap().len(), 3);
    }

    #[test]
    fn test_selection_before_evaluation_is_rejected() {
        let mut world = DiagnosticWorld::new(
            exploitation(),
            SelectionScheme::Tournament(Tournament::new(2)),
            mutation(0.1),
            4,
            2,
            5,
        )
        .unwrap();
        let err = world.selection_step().unwrap_err();
        assert!(matches!(
            err,
            WorldError::Selection(SelectionError::Organism {
                index: 0,
                source: OrganismError::NotScored
            })
        ));
    }

    #[test]
    fn test_evaluation_step_skips_scored_organisms() {
        let mut world = DiagnosticWorld::new(
            exploitation(),
            SelectionScheme::Tournament(Tournament::new(2)),
            mutation(0.1),
            8,
            2,
            5,
        )
        .unwrap();
        assert_eq!(world.evaluation_step().unwrap(), 8);
        assert_eq!(world.evaluation_step().unwrap(), 0);
    }

    #[test]
    fn test_bad_parent_lists_are_rejected() {
        let mut world =
            DiagnosticWorld::new(exploitation(), ShortSelector, mutation(0.1), 4, 2, 5).unwrap();
        world.evaluation_step().unwrap();
        assert!(matches!(
            world.selection_step(),
            Err(WorldError::ParentCount {
                expected: 4,
                found: 3
            })
        ));
        assert!(matches!(
            world.reproduction_step(&[0, 1, 2]),
            Err(WorldError::ParentCount { .. })
        ));
        assert!(matches!(
            world.reproduction_step(&[0, 1, 2, 9]),
            Err(WorldError::ParentOutOfRange {
                index: 9,
                population: 4
            })
        ));
    }

    #[test]
    fn test_world_rejects_invalid_setup() {
        assert!(
            DiagnosticWorld::new(
                exploitation(),
                SelectionScheme::Tournament(Tournament::new(5)),
                mutation(0.1),
                4,
                2,
                0
            )
            .is_err()
        );
        assert!(DiagnosticWorld::new(exploitation(), FirstSlot, mutation(0.1), 0, 2, 0).is_err());
        assert!(DiagnosticWorld::new(exploitation(), FirstSlot, mutation(0.1), 4, 0, 0).is_err());
    }

    #[test]
    fn test_stats_track_optimized_objectives() {
        // every gene starts at 0, far below target: nothing optimized yet
        let mut world = DiagnosticWorld::new(
            exploitation(),
            SelectionScheme::Tournament(Tournament::new(2)),
            mutation(0.0),
            5,
            3,
            0,
        )
        .unwrap();
        let stats = world.step().unwrap();
        assert_eq!(stats.generation, 0);
        assert_eq!(stats.max_optimized, 0);
        assert_eq!(stats.unique_optimized, 0);
        assert_eq!(stats.mean_aggregate, 0.0);
    }

    #[test]
    fn test_checkpoint_resumes_identically() {
        let mut world = DiagnosticWorld::new(
            exploitation(),
            SelectionScheme::FitnessSharing(FitnessSharing {
                tournament_size: 3,
                ..Default::default()
            }),
            mutation(0.4),
            12,
            4,
            99,
        )
        .unwrap();
        world.run(5).unwrap();

        let bytes = bincode::serialize(&world).expect("serialize");
        let mut restored: DiagnosticWorld =
            bincode::deserialize(&bytes).expect("deserialize");

        assert_eq!(restored.generation(), 5);
        assert_eq!(world.run(10).unwrap(), restored.run(10).unwrap());
        assert_eq!(world.population(), restored.population());
    }
}
