//! Training metrics: per-episode statistics, moving averages, log file and plots.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::agent::LearnStats;
use super::plot::line_plot;
use crate::error::AgentError;

/// Number of most recent episodes averaged by [`MetricLogger::record`].
pub const MOVING_AVERAGE_WINDOW: usize = 100;

/// Moving averages emitted by one [`MetricLogger::record`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordSummary {
    pub episode: usize,
    pub step: u64,
    pub epsilon: f64,
    pub mean_reward: f64,
    pub mean_length: f64,
    pub mean_loss: f64,
    pub mean_q: f64,
    /// Seconds since the previous record (or since construction).
    pub time_delta: f64,
}

/// Aggregates step and episode statistics of a training run.
///
/// Writes a fixed-width text log (`log`) and four SVG line plots of the
/// moving averages into `save_dir`. The log is truncated on construction
/// and appended to afterwards; plots are redrawn from scratch each record.
#[derive(Debug)]
pub struct MetricLogger {
    save_log: PathBuf,
    ep_rewards_plot: PathBuf,
    ep_lengths_plot: PathBuf,
    ep_avg_losses_plot: PathBuf,
    ep_avg_qs_plot: PathBuf,

    // History metrics
    ep_rewards: Vec<f64>,
    ep_lengths: Vec<f64>,
    ep_avg_losses: Vec<f64>,
    ep_avg_qs: Vec<f64>,

    // Moving averages, one entry per record() call
    moving_avg_ep_rewards: Vec<f64>,
    moving_avg_ep_lengths: Vec<f64>,
    moving_avg_ep_avg_losses: Vec<f64>,
    moving_avg_ep_avg_qs: Vec<f64>,

    // Current episode
    curr_ep_reward: f64,
    curr_ep_length: u64,
    curr_ep_loss: f64,
    curr_ep_q: f64,
    curr_ep_loss_length: u64,

    record_time: Instant,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Mean of the last [`MOVING_AVERAGE_WINDOW`] entries, `0.0` when empty.
fn recent_mean(values: &[f64]) -> f64 {
    let recent = &values[values.len().saturating_sub(MOVING_AVERAGE_WINDOW)..];
    if recent.is_empty() {
        return 0.0;
    }
    recent.iter().sum::<f64>() / recent.len() as f64
}

fn header() -> String {
    format!(
        "{:>8}{:>8}{:>10}{:>15}{:>15}{:>15}{:>15}{:>15}{:>20}\n",
        "Episode",
        "Step",
        "Epsilon",
        "MeanReward",
        "MeanLength",
        "MeanLoss",
        "MeanQValue",
        "TimeDelta",
        "Time"
    )
}

impl MetricLogger {
    /// Creates `save_dir` if needed and starts a fresh log file in it.
    pub fn new(save_dir: impl AsRef<Path>) -> Result<Self, AgentError> {
        let save_dir = save_dir.as_ref();
        fs::create_dir_all(save_dir)?;
        let save_log = save_dir.join("log");
        fs::write(&save_log, header())?;

        Ok(Self {
            save_log,
            ep_rewards_plot: save_dir.join("reward_plot.svg"),
            ep_lengths_plot: save_dir.join("length_plot.svg"),
            ep_avg_losses_plot: save_dir.join("loss_plot.svg"),
            ep_avg_qs_plot: save_dir.join("q_plot.svg"),
            ep_rewards: Vec::new(),
            ep_lengths: Vec::new(),
            ep_avg_losses: Vec::new(),
            ep_avg_qs: Vec::new(),
            moving_avg_ep_rewards: Vec::new(),
            moving_avg_ep_lengths: Vec::new(),
            moving_avg_ep_avg_losses: Vec::new(),
            moving_avg_ep_avg_qs: Vec::new(),
            curr_ep_reward: 0.0,
            curr_ep_length: 0,
            curr_ep_loss: 0.0,
            curr_ep_q: 0.0,
            curr_ep_loss_length: 0,
            record_time: Instant::now(),
        })
    }

    /// Accumulates one environment step.
    ///
    /// Loss and Q-value only count when the agent actually trained.
    pub fn log_step(&mut self, reward: f64, learned: Option<LearnStats>) {
        self.curr_ep_reward += reward;
        self.curr_ep_length += 1;
        if let Some(stats) = learned {
            self.curr_ep_loss += stats.loss;
            self.curr_ep_q += stats.mean_q;
            self.curr_ep_loss_length += 1;
        }
    }

    /// Marks the end of an episode and resets the per-episode accumulators.
    ///
    /// An episode without any training step records a loss and Q-value of 0.
    pub fn log_episode(&mut self) {
        self.ep_rewards.push(self.curr_ep_reward);
        self.ep_lengths.push(self.curr_ep_length as f64);

        let (ep_avg_loss, ep_avg_q) = if self.curr_ep_loss_length == 0 {
            (0.0, 0.0)
        } else {
            let n = self.curr_ep_loss_length as f64;
            (
                round_to(self.curr_ep_loss / n, 5),
                round_to(self.curr_ep_q / n, 5),
            )
        };
        self.ep_avg_losses.push(ep_avg_loss);
        self.ep_avg_qs.push(ep_avg_q);

        self.curr_ep_reward = 0.0;
        self.curr_ep_length = 0;
        self.curr_ep_loss = 0.0;
        self.curr_ep_q = 0.0;
        self.curr_ep_loss_length = 0;
    }

    /// Appends moving averages to the history, the log file and the plots.
    ///
    /// # Errors
    ///
    /// Log and plot write failures propagate.
    pub fn record(
        &mut self,
        episode: usize,
        epsilon: f64,
        step: u64,
    ) -> Result<RecordSummary, AgentError> {
        let mean_reward = round_to(recent_mean(&self.ep_rewards), 3);
        let mean_length = round_to(recent_mean(&self.ep_lengths), 3);
        let mean_loss = round_to(recent_mean(&self.ep_avg_losses), 3);
        let mean_q = round_to(recent_mean(&self.ep_avg_qs), 3);
        self.moving_avg_ep_rewards.push(mean_reward);
        self.moving_avg_ep_lengths.push(mean_length);
        self.moving_avg_ep_avg_losses.push(mean_loss);
        self.moving_avg_ep_avg_qs.push(mean_q);

        let now = Instant::now();
        let time_delta = round_to(now.duration_since(self.record_time).as_secs_f64(), 3);
        self.record_time = now;
        let timestamp = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();

        log::info!(
            "Episode {} - Step {} - Epsilon {:.3} - Mean Reward {} - Mean Length {} - \
             Mean Loss {} - Mean Q Value {} - Time Delta {} - Time {}",
            episode,
            step,
            epsilon,
            mean_reward,
            mean_length,
            mean_loss,
            mean_q,
            time_delta,
            timestamp
        );

        let mut file = OpenOptions::new().append(true).open(&self.save_log)?;
        writeln!(
            file,
            "{:8}{:8}{:10.3}{:15.3}{:15.3}{:15.3}{:15.3}{:15.3}{:>20}",
            episode, step, epsilon, mean_reward, mean_length, mean_loss, mean_q, time_delta, timestamp
        )?;

        for (path, title, series) in [
            (&self.ep_rewards_plot, "Mean reward", &self.moving_avg_ep_rewards),
            (&self.ep_lengths_plot, "Mean length", &self.moving_avg_ep_lengths),
            (&self.ep_avg_losses_plot, "Mean loss", &self.moving_avg_ep_avg_losses),
            (&self.ep_avg_qs_plot, "Mean Q value", &self.moving_avg_ep_avg_qs),
        ] {
            line_plot(path, title, series)?;
        }

        Ok(RecordSummary {
            episode,
            step,
            epsilon,
            mean_reward,
            mean_length,
            mean_loss,
            mean_q,
            time_delta,
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.save_log
    }

    /// Paths of the reward, length, loss and Q-value plots.
    pub fn plot_paths(&self) -> [&Path; 4] {
        [
            self.ep_rewards_plot.as_path(),
            self.ep_lengths_plot.as_path(),
            self.ep_avg_losses_plot.as_path(),
            self.ep_avg_qs_plot.as_path(),
        ]
    }

    pub fn episode_rewards(&self) -> &[f64] {
        &self.ep_rewards
    }

    pub fn episode_lengths(&self) -> &[f64] {
        &self.ep_lengths
    }

    pub fn episode_avg_losses(&self) -> &[f64] {
        &self.ep_avg_losses
    }

    pub fn episode_avg_qs(&self) -> &[f64] {
        &self.ep_avg_qs
    }

    pub fn moving_avg_rewards(&self) -> &[f64] {
        &self.moving_avg_ep_rewards
    }
}
