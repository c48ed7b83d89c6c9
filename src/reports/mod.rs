use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use sahga::io::BatchJob;
use sahga::optimizer::{ConfusionSummary, FitOutcome};
use std::time::Duration;

pub struct BatchRow {
    pub job: BatchJob,
    pub result: Result<f64, String>,
    pub elapsed: Duration,
}

fn right_align(table: &mut Table, from: usize, to: usize) {
    for i in from..=to {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn print_fit_report(outcome: &FitOutcome, summary: &ConfusionSummary, elapsed: Duration) {
    let mut trace = Table::new();
    trace
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    trace.add_row(vec![
        Cell::new("Gen").add_attribute(Attribute::Bold),
        Cell::new("Best").fg(Color::Cyan),
        Cell::new("Population"),
        Cell::new("SA Cycles"),
        Cell::new("Final T"),
    ]);
    right_align(&mut trace, 0, 4);

    for r in &outcome.trace {
        trace.add_row(vec![
            Cell::new(r.generation),
            Cell::new(format!("{:.6}", r.best_fitness)).fg(Color::Cyan),
            Cell::new(format!("{:.6}", r.population_best)),
            Cell::new(r.sa_cycles),
            Cell::new(format!("{:.5}", r.temperature)),
        ]);
    }
    println!("\n{}", trace);

    let coefficients = outcome.coefficients();
    let mut coef = Table::new();
    coef.load_preset(ASCII_FULL);
    coef.add_row(vec![
        Cell::new("Term").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    right_align(&mut coef, 1, 1);
    for (name, value) in term_names(outcome, coefficients.len())
        .into_iter()
        .zip(&coefficients)
    {
        coef.add_row(vec![Cell::new(name), Cell::new(format!("{:.8}", value))]);
    }
    println!("{}", coef);

    print_confusion(summary);
    println!(
        "Model: {} | Objective: {} | Time: {:.2?}",
        outcome.model, outcome.objective, elapsed
    );
    println!("Fitness: {:.8}", outcome.fitness());
}

/// Labels for the genome layout of each model.
fn term_names(outcome: &FitOutcome, genes: usize) -> Vec<String> {
    use sahga::config::ModelType;

    let mut names = Vec::with_capacity(genes);
    match outcome.model {
        ModelType::Linear => {
            for j in 1..genes {
                names.push(format!("x{}", j));
            }
            names.push("constant".into());
        }
        ModelType::Quadratic => {
            for j in 1..=(genes.saturating_sub(1) / 2) {
                names.push(format!("x{}^2", j));
                names.push(format!("x{}", j));
            }
            names.push("constant".into());
        }
        ModelType::SpatialLag => {
            for j in 1..genes.saturating_sub(1) {
                names.push(format!("x{}", j));
            }
            names.push("constant".into());
            names.push("lambda".into());
        }
    }
    names
}

pub fn print_confusion(s: &ConfusionSummary) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.add_row(vec![
        Cell::new("").add_attribute(Attribute::Bold),
        Cell::new("Predicted 1").add_attribute(Attribute::Bold),
        Cell::new("Predicted 0").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Observed 1"),
        Cell::new(s.true_pos).fg(Color::Green),
        Cell::new(s.false_neg).fg(Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Observed 0"),
        Cell::new(s.false_pos).fg(Color::Red),
        Cell::new(s.true_neg).fg(Color::Green),
    ]);
    right_align(&mut table, 1, 2);
    println!("{}", table);
    println!(
        "Accuracy: {:.4} | Misclassified: {} | Sum of squares: {:.6}",
        s.accuracy(),
        s.misclassified(),
        s.sum_squares
    );
}

pub fn print_batch_report(rows: &[BatchRow]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new("Job").add_attribute(Attribute::Bold),
        Cell::new("Population"),
        Cell::new("Generations"),
        Cell::new("Objective"),
        Cell::new("Fitness").fg(Color::Cyan),
        Cell::new("Time"),
    ]);
    right_align(&mut table, 0, 2);
    right_align(&mut table, 4, 5);

    for row in rows {
        let fitness = match &row.result {
            Ok(f) => Cell::new(format!("{:.6}", f)).fg(Color::Cyan),
            Err(e) => Cell::new(e).fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(row.job.id),
            Cell::new(row.job.population),
            Cell::new(row.job.generations),
            Cell::new(row.job.objective),
            fitness,
            Cell::new(format!("{:.2?}", row.elapsed)),
        ]);
    }
    println!("\n{}", table);

    let best = rows
        .iter()
        .filter_map(|r| r.result.as_ref().ok().map(|f| (r.job.id, *f)))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((id, fitness)) = best {
        println!("Best job: {} | Fitness: {:.8}", id, fitness);
    }
}
