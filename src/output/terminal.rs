// Colored terminal output for verdicts, training runs and model summaries.
//
// This module handles all terminal-specific formatting. The main.rs command
// handlers delegate here and never print model internals themselves.

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::classifier::metrics::Evaluation;
use crate::classifier::{FittedModel, Prediction, TrainingReport};

/// Width of the probability bars, in cells.
const BAR_WIDTH: usize = 30;

/// Display one document's prediction: both class probabilities and the verdict.
pub fn display_prediction(prediction: &Prediction, excerpt: &str) {
    println!("\n{}", "=== Verdict ===".bold());
    if !excerpt.is_empty() {
        println!("  {}", format!("\"{}\"", super::truncate_chars(excerpt, 100)).dimmed());
    }
    println!();

    for (i, (label, p)) in prediction
        .classes
        .iter()
        .zip(prediction.probabilities)
        .enumerate()
    {
        println!(
            "  {:<10} {:>6.1}%  {}",
            colorize_label(label, i),
            p * 100.0,
            bar(p)
        );
    }

    let verdict = &prediction.verdict;
    println!(
        "\n  Verdict: {} ({:.1}% confidence)",
        colorize_label(&verdict.label, verdict.class_index).bold(),
        verdict.confidence
    );
}

/// Display what a training run produced.
pub fn display_training_report(report: &TrainingReport, classes: &[String; 2]) {
    println!("\n{}", "=== Training ===".bold());
    println!("  Documents:  {}", report.documents);
    println!(
        "  Classes:    {} ({}), {} ({})",
        colorize_label(&classes[0], 0),
        report.class_counts[0],
        colorize_label(&classes[1], 1),
        report.class_counts[1]
    );
    println!("  Vocabulary: {} terms", report.vocabulary);

    let status = if report.optimizer.converged {
        "converged".green()
    } else {
        "stopped at max_iter".yellow()
    };
    println!(
        "  Optimizer:  {} after {} iterations (objective {:.6})",
        status, report.optimizer.iterations, report.optimizer.final_objective
    );
}

/// Display holdout metrics and the confusion matrix.
pub fn display_evaluation(eval: &Evaluation) {
    println!(
        "\n{}",
        format!("=== Holdout Evaluation ({} documents) ===", eval.total()).bold()
    );
    println!("  Accuracy: {:.1}%", eval.accuracy * 100.0);
    println!("  Log loss: {:.4}", eval.log_loss);
    println!();

    println!(
        "  {:<10} {:>9}  {:>6}  {:>6}  {:>7}",
        "Class".dimmed(),
        "Precision".dimmed(),
        "Recall".dimmed(),
        "F1".dimmed(),
        "Support".dimmed(),
    );
    println!("  {}", "-".repeat(46).dimmed());
    for (i, m) in eval.per_class.iter().enumerate() {
        println!(
            "  {:<10} {:>9.3}  {:>6.3}  {:>6.3}  {:>7}",
            colorize_label(&m.label, i),
            m.precision,
            m.recall,
            m.f1,
            m.support
        );
    }

    println!("\n  Confusion (rows = actual, columns = predicted):");
    println!("  {:<10} {:>8} {:>8}", "", eval.classes[0], eval.classes[1]);
    for (i, row) in eval.confusion.iter().enumerate() {
        println!("  {:<10} {:>8} {:>8}", eval.classes[i], row[0], row[1]);
    }
}

/// Display artifact metadata and the most influential terms per class.
pub fn display_model_summary(model: &FittedModel, trained_at: Option<DateTime<Utc>>, top: usize) {
    let classes = model.classes();
    let vectorizer = model.vectorizer();

    println!("\n{}", "=== Model ===".bold());
    println!(
        "  Classes:    [0] {}  [1] {}",
        colorize_label(&classes[0], 0),
        colorize_label(&classes[1], 1)
    );
    println!("  Vocabulary: {} terms", vectorizer.vocabulary_size());
    println!(
        "  Analyzer:   {} stop words, stemming {}",
        vectorizer.analyzer().stop_words().len(),
        if vectorizer.analyzer().stems() { "on" } else { "off" }
    );
    println!("  Intercept:  {:+.4}", model.classifier().intercept());
    if let Some(at) = trained_at {
        println!("  Trained:    {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    let [toward0, toward1] = model.top_terms(top);
    for (i, terms) in [toward0, toward1].iter().enumerate() {
        println!(
            "\n  Terms pointing to {}:",
            colorize_label(&classes[i], i).bold()
        );
        if terms.is_empty() {
            println!("    {}", "(none)".dimmed());
        }
        for (term, weight) in terms {
            println!("    {:<24} {:+.4}", term, weight);
        }
    }
}

fn bar(p: f64) -> String {
    let filled = ((p.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled).dimmed())
}

/// Colorize a class label. Well-known credibility labels get fixed colors;
/// anything else is colored by its position in the class order.
fn colorize_label(label: &str, class_index: usize) -> colored::ColoredString {
    match label.to_ascii_uppercase().as_str() {
        "REAL" | "TRUE" => label.green(),
        "FAKE" | "FALSE" => label.red(),
        _ if class_index == 0 => label.yellow(),
        _ => label.cyan(),
    }
}
