//! Dashboard rendering: a pure function of a training snapshot.
//!
//! No process-wide state, no mutating calls back into the engine. The
//! binary polls a `SnapshotHandle`, passes the snapshot here, and
//! prints whatever comes back.

use std::fmt::Write as _;

use crate::training::{TrainerStatus, TrainingSnapshot, WorkerSnapshot};

/// Maximum worker rows rendered; the pool can be larger than a screen.
const MAX_ROWS: usize = 20;

/// Render a snapshot as a fixed-width table, workers sorted by loss
/// rate descending.
#[must_use]
pub fn render(snapshot: &TrainingSnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Epoch {} | Generation {} | Workers {}",
        snapshot.epoch,
        snapshot.generation,
        snapshot.workers.len()
    );
    match snapshot.best {
        Some(best) => {
            let _ = writeln!(
                out,
                "Best: worker {} (gen {}, score {}, {} moves)",
                best.worker_id, best.generation, best.score, best.moves
            );
        }
        None => {
            let _ = writeln!(out, "Best: none yet");
        }
    }

    let _ = writeln!(
        out,
        "{:>3}  {:>4}  {:<10}  {:<9}  {:>6}  {:>5}  {:>7}  {:<8}  {:<14}  prediction",
        "id", "gen", "status", "loss", "score", "moves", "invalid", "type", "lineage"
    );

    let mut rows: Vec<&WorkerSnapshot> = snapshot.workers.iter().collect();
    rows.sort_by(|a, b| {
        b.loss_rate
            .partial_cmp(&a.loss_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for worker in rows.into_iter().take(MAX_ROWS) {
        let _ = writeln!(
            out,
            "{:>3}  {:>4}  {:<10}  {:<9}  {:>6}  {:>5}  {:>7}  {:<8}  {:<14}  {}",
            worker.worker_id,
            worker.generation,
            status_label(worker.status),
            format!("{:.3}", worker.loss_rate),
            worker.score,
            worker.moves,
            worker.invalid_moves,
            worker.policy_kind,
            lineage_label(&worker.lineage),
            prediction_label(worker),
        );
    }

    out
}

/// Long ancestry chains are elided from the left, keeping the most
/// recent tags.
fn lineage_label(lineage: &str) -> String {
    const MAX: usize = 14;
    if lineage.len() <= MAX {
        return lineage.to_string();
    }
    let tail = &lineage[lineage.len() - (MAX - 2)..];
    format!("..{tail}")
}

fn status_label(status: TrainerStatus) -> &'static str {
    match status {
        TrainerStatus::Idle => "idle",
        TrainerStatus::Running => "running",
        TrainerStatus::Terminated(end) => {
            use crate::training::EpisodeEnd::*;
            match end {
                Won => "won",
                Stuck => "stuck",
                MaxMoves => "max-moves",
                MinScore => "min-score",
                Aborted => "aborted",
            }
        }
        TrainerStatus::Dead => "dead",
    }
}

fn prediction_label(worker: &WorkerSnapshot) -> String {
    match worker.last_prediction {
        Some(p) => format!(
            "{} -> {} ({}){} dev {:.1}",
            p.from,
            p.to,
            p.subject,
            if p.valid { "" } else { " [invalid]" },
            p.deviation
        ),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::{BestWorker, EpisodeEnd};

    fn worker(id: usize, loss: f64) -> WorkerSnapshot {
        WorkerSnapshot {
            worker_id: id,
            generation: 1,
            status: TrainerStatus::Terminated(EpisodeEnd::Stuck),
            score: 15,
            moves: 42,
            invalid_moves: 7,
            loss_rate: loss,
            lineage: "root/1".to_string(),
            policy_kind: "linear".to_string(),
            last_prediction: None,
        }
    }

    #[test]
    fn test_render_sorts_by_loss() {
        let snapshot = TrainingSnapshot {
            epoch: 3,
            generation: 2,
            best: Some(BestWorker { worker_id: 1, generation: 2, score: 30, moves: 20 }),
            workers: vec![worker(0, 0.1), worker(1, 0.9)],
        };

        let text = render(&snapshot);
        let pos0 = text.find("\n  0  ").unwrap();
        let pos1 = text.find("\n  1  ").unwrap();
        assert!(pos1 < pos0, "higher loss should render first");
        assert!(text.contains("Best: worker 1"));
    }

    #[test]
    fn test_render_includes_lineage() {
        let snapshot = TrainingSnapshot {
            epoch: 1,
            generation: 1,
            best: None,
            workers: vec![worker(0, 0.5)],
        };

        let text = render(&snapshot);
        assert!(text.contains("lineage"));
        assert!(text.contains("root/1"));
    }

    #[test]
    fn test_long_lineage_is_elided() {
        let label = lineage_label("root/12/345/678/901/234");
        assert!(label.len() <= 14);
        assert!(label.starts_with(".."));
        assert!(label.ends_with("234"));
    }

    #[test]
    fn test_render_without_best() {
        let snapshot = TrainingSnapshot {
            epoch: 0,
            generation: 0,
            best: None,
            workers: vec![],
        };
        assert!(render(&snapshot).contains("Best: none yet"));
    }
}
