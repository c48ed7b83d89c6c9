use proptest::prelude::*;
use sahga::optimizer::genetic::{roulette_index, selection_weight_sum};
use sahga::optimizer::{rank_population, Chromosome};
use sahga::ranking::{quicksort, SortOrder};
use sahga::table::ObservationTable;

// --- STRATEGIES ---

prop_compose! {
    fn arb_table()(rows in 2usize..30, cols in 1usize..6)(
        values in proptest::collection::vec(-1000.0..1000.0f64, rows * cols),
        cols in Just(cols)
    ) -> ObservationTable {
        let data: Vec<Vec<f64>> = values.chunks(cols).map(|c| c.to_vec()).collect();
        ObservationTable::from_rows(&data).unwrap()
    }
}

prop_compose! {
    fn arb_population()(
        fitness in proptest::collection::vec(0.0..500.0f64, 1..60)
    ) -> Vec<Chromosome> {
        let mut pop: Vec<Chromosome> = fitness
            .into_iter()
            .map(|f| Chromosome { fitness: f, genes: vec![] })
            .collect();
        rank_population(&mut pop);
        pop
    }
}

fn naive_stats(column: &[f64]) -> (f64, f64) {
    let n = column.len() as f64;
    let mean = column.iter().sum::<f64>() / n;
    let var = column.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_stats_match_reference(mut table in arb_table()) {
        table.update_stats().unwrap();
        for j in 0..table.cols() {
            let (mean, sd) = naive_stats(&table.column(j));
            let s = table.stats()[j];
            prop_assert!((s.mean - mean).abs() < 1e-9 * (1.0 + mean.abs()));
            prop_assert!((s.std_dev - sd).abs() < 1e-6 * (1.0 + sd));
        }
    }

    #[test]
    fn prop_normalize_is_idempotent(mut table in arb_table()) {
        table.update_stats().unwrap();
        // Near-constant columns are a different failure mode.
        prop_assume!(table.stats().iter().all(|s| s.std_dev > 1e-3));

        table.normalize(false).unwrap();
        for s in table.stats() {
            prop_assert!(s.mean.abs() < 1e-9);
            prop_assert!((s.std_dev - 1.0).abs() < 1e-9);
        }

        let once = table.clone();
        table.normalize(false).unwrap();
        for i in 0..table.rows() {
            for j in 0..table.cols() {
                prop_assert!((table.at(i, j) - once.at(i, j)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn prop_rank_rows_sorts_descending(mut table in arb_table(), col_seed in 0usize..6) {
        let col = col_seed % table.cols();
        let mut before: Vec<Vec<f64>> = (0..table.rows()).map(|i| table.row(i).to_vec()).collect();
        let hi = table.rows() - 1;
        table.rank_rows_by_column(col, 0, hi).unwrap();

        let keys = table.column(col);
        prop_assert!(keys.windows(2).all(|w| w[0] >= w[1]));

        // Same multiset of rows.
        let mut after: Vec<Vec<f64>> = (0..table.rows()).map(|i| table.row(i).to_vec()).collect();
        let by_bits = |a: &Vec<f64>, b: &Vec<f64>| {
            a.iter().map(|x| x.to_bits()).cmp(b.iter().map(|x| x.to_bits()))
        };
        before.sort_by(by_bits);
        after.sort_by(by_bits);
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_quicksort_orders(mut values in proptest::collection::vec(-50.0..50.0f64, 1..200)) {
        let hi = values.len() - 1;
        quicksort(values.as_mut_slice(), 0, hi, SortOrder::Ascending);
        prop_assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prop_selection_returns_first_reaching_index(pop in arb_population(), u in 0.0..1.0f64) {
        let factor = pop.last().unwrap().fitness + 1.0;
        let sum = selection_weight_sum(&pop, factor);
        let threshold = u * sum;
        let idx = roulette_index(&pop, factor, threshold);

        prop_assert!(idx < pop.len());
        let cumulative = |k: usize| pop[..=k].iter().map(|c| factor - c.fitness).sum::<f64>();
        if idx > 0 {
            // The walk did not stop a step early.
            prop_assert!(cumulative(idx - 1) < threshold);
        }
        if idx < pop.len() - 1 {
            prop_assert!(cumulative(idx) >= threshold);
        }
    }

    #[test]
    fn prop_ranked_population_ascending(pop in arb_population()) {
        prop_assert!(pop.windows(2).all(|w| w[0].fitness <= w[1].fitness));
    }
}
