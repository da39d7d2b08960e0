//! Epsilon-greedy DQN agent over dependency graphs.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::AgentConfig;
use super::network::{NetworkRole, QNetwork};
use super::training::ReplayBuffer;
use crate::error::AgentError;
use crate::types::{State, Transition};

/// Action passed to the environment when the agent has nothing to pick.
pub const NO_ACTION: usize = 0;

/// Result of a learning step that actually trained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearnStats {
    /// Mean TD-estimate over the processed samples.
    pub mean_q: f64,
    /// Sum of per-sample losses.
    pub loss: f64,
}

/// Deep Q-learning agent.
///
/// Owns the network pair, the replay memory and the exploration schedule.
/// Every interaction is sequential: `act`, `cache`, then `learn` once per
/// environment step.
///
/// # Lifecycle
///
/// 1. [`Agent::new`] validates the configuration.
/// 2. [`Agent::act`] picks a legal node (or `None` when nothing is legal).
/// 3. [`Agent::cache`] stores the resulting transition.
/// 4. [`Agent::learn`] syncs, checkpoints and trains on its own schedule.
pub struct Agent<N: QNetwork, R: Rng = StdRng> {
    config: AgentConfig,
    net: N,
    memory: ReplayBuffer,
    exploration_rate: f64,
    curr_step: u64,
    rng: R,
}

impl<N: QNetwork> Agent<N, StdRng> {
    /// Creates an agent seeded from OS entropy.
    pub fn new(config: AgentConfig, net: N) -> Result<Self, AgentError> {
        Self::with_rng(config, net, StdRng::from_entropy())
    }
}

impl<N: QNetwork, R: Rng> Agent<N, R> {
    /// Creates an agent drawing all randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if the configuration is invalid.
    pub fn with_rng(config: AgentConfig, net: N, rng: R) -> Result<Self, AgentError> {
        config.validate()?;
        let memory = ReplayBuffer::new(config.memory_capacity)?;
        Ok(Self {
            exploration_rate: config.exploration_rate,
            config,
            net,
            memory,
            curr_step: 0,
            rng,
        })
    }

    /// Picks the next node to schedule.
    ///
    /// With probability `exploration_rate` a uniformly random legal action
    /// is returned; otherwise the legal action with the highest *target*
    /// network Q-value. Returns `None` when the legal-action set is empty.
    ///
    /// Every call decays the exploration rate and advances the step
    /// counter, whether or not an action was available.
    ///
    /// # Errors
    ///
    /// Fails on a state whose features or legal actions do not fit its
    /// graph, even when exploring, and on network errors.
    pub fn act(&mut self, state: &State) -> Result<Option<usize>, AgentError> {
        let action = self.select_action(state);

        self.exploration_rate = (self.exploration_rate * self.config.exploration_rate_decay)
            .max(self.config.exploration_rate_min);
        self.curr_step += 1;

        action
    }

    fn select_action(&mut self, state: &State) -> Result<Option<usize>, AgentError> {
        state.validate()?;
        let legal = &state.legal_actions;
        if legal.is_empty() {
            return Ok(None);
        }

        if self.rng.gen::<f64>() < self.exploration_rate {
            let index = self.rng.gen_range(0..legal.len());
            return Ok(Some(legal[index]));
        }

        let q = self
            .net
            .evaluate(&state.graph, &state.features, NetworkRole::Target)?;
        best_legal_action(&q, legal).map(Some)
    }

    /// Stores one experience in the replay memory.
    pub fn cache(
        &mut self,
        state: State,
        next_state: State,
        action: usize,
        reward: f64,
        done: bool,
    ) {
        self.memory.push(Transition {
            state,
            next_state,
            action,
            reward,
            done,
        });
    }

    /// Samples a training batch, or `None` if memory holds too few transitions.
    pub fn recall(&mut self) -> Option<Vec<Transition>> {
        self.memory
            .sample(self.config.batch_size, &mut self.rng)
            .map(|batch| batch.into_iter().cloned().collect())
    }

    /// Online Q-value of `action` in `state`, kept differentiable.
    pub fn td_estimate(&self, state: &State, action: usize) -> Result<N::Estimate, AgentError> {
        self.net.estimate(&state.graph, &state.features, action)
    }

    /// Bootstrapped target `reward + (1 - done) · γ · Q_target(s', a*)`.
    ///
    /// `a*` is the online network's best legal action in `next_state`.
    /// Without legal actions in `next_state`, or when `done`, the target is
    /// exactly `reward`.
    pub fn td_target(
        &self,
        reward: f64,
        next_state: &State,
        done: bool,
    ) -> Result<f64, AgentError> {
        if next_state.legal_actions.is_empty() || done {
            return Ok(reward);
        }

        let online = self
            .net
            .evaluate(&next_state.graph, &next_state.features, NetworkRole::Online)?;
        let best_action = best_legal_action(&online, &next_state.legal_actions)?;

        let target = self
            .net
            .evaluate(&next_state.graph, &next_state.features, NetworkRole::Target)?;
        let next_q = target
            .get(best_action)
            .copied()
            .ok_or(AgentError::NodeOutOfRange {
                node: best_action,
                num_nodes: target.len(),
            })?;

        Ok(reward + self.config.gamma * next_q)
    }

    /// Runs one optimizer step on the online network; returns the loss.
    ///
    /// A non-finite loss is returned unchanged.
    pub fn update_q_online(
        &mut self,
        estimate: N::Estimate,
        target: f64,
    ) -> Result<f64, AgentError> {
        let loss = self.net.update(estimate, target)?;
        if !loss.is_finite() {
            log::warn!("non-finite TD loss {} at step {}", loss, self.curr_step);
        }
        Ok(loss)
    }

    /// Copies the online parameters into the target network.
    pub fn sync_q_target(&mut self) -> Result<(), AgentError> {
        self.net.sync()?;
        log::debug!("target network synced at step {}", self.curr_step);
        Ok(())
    }

    /// Path of the checkpoint written at the current step.
    pub fn checkpoint_path(&self) -> PathBuf {
        self.config.save_dir.join(format!(
            "{}_{}.chkpt",
            self.config.checkpoint_prefix,
            self.curr_step / self.config.save_every
        ))
    }

    /// Writes both networks and the exploration rate to
    /// [`checkpoint_path`](Self::checkpoint_path).
    pub fn save(&self) -> Result<PathBuf, AgentError> {
        fs::create_dir_all(&self.config.save_dir)?;
        let path = self.checkpoint_path();
        self.net.save_checkpoint(&path, self.exploration_rate)?;
        log::info!(
            "checkpoint saved to {} at step {}",
            path.display(),
            self.curr_step
        );
        Ok(path)
    }

    /// Restores networks and exploration rate from a checkpoint.
    pub fn load(&mut self, path: &Path) -> Result<(), AgentError> {
        let rate = self.net.load_checkpoint(path)?;
        self.exploration_rate = rate.max(self.config.exploration_rate_min);
        log::info!(
            "checkpoint loaded from {} (exploration rate {})",
            path.display(),
            self.exploration_rate
        );
        Ok(())
    }

    /// Runs the per-step schedule: sync, save, then possibly train.
    ///
    /// Sync and save trigger independently whenever the step counter is a
    /// multiple of their interval. Training runs only past burn-in, on
    /// `learn_every` boundaries, and when memory can fill a batch.
    ///
    /// Returns `Ok(None)` whenever no training happened, including when
    /// every sampled transition had an empty legal-action set.
    ///
    /// # Errors
    ///
    /// Checkpoint I/O failures and network errors propagate.
    pub fn learn(&mut self) -> Result<Option<LearnStats>, AgentError> {
        if self.curr_step % self.config.sync_every == 0 {
            self.sync_q_target()?;
        }

        if self.curr_step % self.config.save_every == 0 {
            self.save()?;
        }

        if self.curr_step < self.config.burnin {
            return Ok(None);
        }

        if self.curr_step % self.config.learn_every != 0 {
            return Ok(None);
        }

        let Some(batch) = self.recall() else {
            return Ok(None);
        };

        let mut estimates = Vec::with_capacity(batch.len());
        let mut total_loss = 0.0;
        for t in &batch {
            if !t.state.has_legal_actions() {
                continue;
            }
            let estimate = self.td_estimate(&t.state, t.action)?;
            let q = self.net.estimate_value(&estimate);
            let target = self.td_target(t.reward, &t.next_state, t.done)?;
            total_loss += self.update_q_online(estimate, target)?;
            estimates.push(q);
        }

        if estimates.is_empty() {
            return Ok(None);
        }
        let mean_q = estimates.iter().sum::<f64>() / estimates.len() as f64;
        Ok(Some(LearnStats {
            mean_q,
            loss: total_loss,
        }))
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    pub fn curr_step(&self) -> u64 {
        self.curr_step
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    pub fn network(&self) -> &N {
        &self.net
    }

    pub fn network_mut(&mut self) -> &mut N {
        &mut self.net
    }
}

/// Legal action with the highest Q-value; ties go to the earliest in `legal`.
///
/// A NaN among the legal Q-values has no rank and is reported as
/// [`AgentError::Network`].
fn best_legal_action(q: &[f64], legal: &[usize]) -> Result<usize, AgentError> {
    let mut best: Option<(usize, f64)> = None;
    for &node in legal {
        let value = *q.get(node).ok_or(AgentError::NodeOutOfRange {
            node,
            num_nodes: q.len(),
        })?;
        if value.is_nan() {
            return Err(AgentError::Network(format!(
                "Q-value of node {} is NaN",
                node
            )));
        }
        match best {
            Some((_, v)) if value <= v => {}
            _ => best = Some((node, value)),
        }
    }
    best.map(|(node, _)| node)
        .ok_or_else(|| AgentError::Shape("no legal actions to rank".to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::rl::network::{TabularQNetwork, TdLoss};
    use crate::types::{NodeFeatures, TaskGraph};

    fn graph(n: usize) -> Arc<TaskGraph> {
        let mut g = TaskGraph::new();
        for _ in 0..n {
            g.add_node(());
        }
        Arc::new(g)
    }

    fn state(n: usize, legal: Vec<usize>) -> State {
        State::new(graph(n), Arc::new(NodeFeatures::zeros(n, 5)), legal)
    }

    fn config(dir: &Path) -> AgentConfig {
        AgentConfig {
            save_dir: dir.to_path_buf(),
            ..AgentConfig::default()
        }
    }

    fn greedy_config(dir: &Path) -> AgentConfig {
        AgentConfig {
            exploration_rate: 0.0,
            exploration_rate_min: 0.0,
            ..config(dir)
        }
    }

    fn agent(config: AgentConfig, table: Vec<f64>) -> Agent<TabularQNetwork, StdRng> {
        let net = TabularQNetwork::new(table, 0.1, TdLoss::Mse);
        Agent::with_rng(config, net, StdRng::seed_from_u64(3)).unwrap()
    }

    #[test]
    fn invalid_config_fails_fast() {
        let cfg = AgentConfig {
            batch_size: 0,
            ..AgentConfig::default()
        };
        let net = TabularQNetwork::new(vec![], 0.1, TdLoss::Mse);
        assert!(matches!(Agent::new(cfg, net), Err(AgentError::Config(_))));
    }

    #[test]
    fn empty_legal_set_returns_none_and_still_decays() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AgentConfig {
            exploration_rate_decay: 0.5,
            ..config(dir.path())
        };
        let mut a = agent(cfg, vec![]);
        let s = state(3, vec![]);
        assert_eq!(a.act(&s).unwrap(), None);
        assert_eq!(a.exploration_rate(), 0.5);
        assert_eq!(a.curr_step(), 1);
    }

    #[test]
    fn exploration_is_non_increasing_and_floored() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AgentConfig {
            exploration_rate_decay: 0.9,
            exploration_rate_min: 0.3,
            ..config(dir.path())
        };
        let mut a = agent(cfg, vec![0.0; 4]);
        let s = state(4, vec![0, 1, 2, 3]);
        let mut prev = a.exploration_rate();
        for _ in 0..100 {
            a.act(&s).unwrap();
            assert!(a.exploration_rate() <= prev);
            assert!(a.exploration_rate() >= 0.3);
            prev = a.exploration_rate();
        }
        assert_eq!(a.exploration_rate(), 0.3);
    }

    #[test]
    fn exploration_only_picks_legal_actions() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AgentConfig {
            exploration_rate_decay: 1.0,
            ..config(dir.path())
        };
        let mut a = agent(cfg, vec![]);
        let s = state(10, vec![3, 7]);
        for _ in 0..50 {
            let action = a.act(&s).unwrap().unwrap();
            assert!(action == 3 || action == 7);
        }
    }

    #[test]
    fn exploit_reads_target_network() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = agent(greedy_config(dir.path()), vec![1.0, 0.0]);
        let s = state(2, vec![0, 1]);

        // Push online toward node 1 without syncing.
        for _ in 0..50 {
            let est = a.td_estimate(&s, 1).unwrap();
            a.update_q_online(est, 10.0).unwrap();
        }
        assert!(a.network().online_values()[1] > 1.0);
        assert_eq!(a.act(&s).unwrap(), Some(0));

        a.sync_q_target().unwrap();
        assert_eq!(a.act(&s).unwrap(), Some(1));
    }

    #[test]
    fn exploit_rejects_out_of_range_action() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = agent(greedy_config(dir.path()), vec![]);
        let s = state(2, vec![5]);
        assert!(matches!(
            a.act(&s),
            Err(AgentError::NodeOutOfRange { node: 5, .. })
        ));
        assert_eq!(a.curr_step(), 1);
    }

    #[test]
    fn act_rejects_malformed_state_while_exploring() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = agent(config(dir.path()), vec![]);
        assert_eq!(a.exploration_rate(), 1.0);

        let misaligned = State::new(graph(3), Arc::new(NodeFeatures::zeros(2, 5)), vec![0]);
        assert!(matches!(a.act(&misaligned), Err(AgentError::Shape(_))));

        let dangling = state(2, vec![0, 4]);
        assert!(matches!(
            a.act(&dangling),
            Err(AgentError::NodeOutOfRange { node: 4, num_nodes: 2 })
        ));
        assert_eq!(a.curr_step(), 2);
    }

    #[test]
    fn td_target_without_legal_actions_is_reward() {
        let dir = tempfile::tempdir().unwrap();
        let a = agent(config(dir.path()), vec![100.0; 3]);
        let next = state(3, vec![]);
        assert_eq!(a.td_target(2.5, &next, false).unwrap(), 2.5);
        assert_eq!(a.td_target(2.5, &next, true).unwrap(), 2.5);
    }

    #[test]
    fn td_target_done_masks_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let a = agent(config(dir.path()), vec![f64::NAN, 100.0]);
        let next = state(2, vec![0, 1]);
        assert_eq!(a.td_target(-1.0, &next, true).unwrap(), -1.0);
    }

    #[test]
    fn td_target_uses_online_argmax_and_target_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = agent(config(dir.path()), vec![0.0, 0.0, 0.0]);
        let next = state(3, vec![1, 2]);

        // Target learns to prefer node 1, online then moves on to node 2.
        let est = a.td_estimate(&next, 1).unwrap();
        a.update_q_online(est, 5.0).unwrap();
        a.sync_q_target().unwrap();
        for _ in 0..20 {
            let est = a.td_estimate(&next, 2).unwrap();
            a.update_q_online(est, 10.0).unwrap();
        }

        let online = a.network().online_values().to_vec();
        let target = a.network().target_values().to_vec();
        assert!(online[2] > online[1]);
        assert!(target[1] > target[2]);

        let got = a.td_target(1.0, &next, false).unwrap();
        let expected = 1.0 + 0.9 * target[2];
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn learn_waits_for_burnin_and_learn_every() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AgentConfig {
            burnin: 4,
            learn_every: 3,
            batch_size: 2,
            memory_capacity: 10,
            ..config(dir.path())
        };
        let mut a = agent(cfg, vec![0.0; 2]);
        let s = state(2, vec![0, 1]);
        for _ in 0..8 {
            a.cache(s.clone(), s.clone(), 0, 1.0, false);
        }

        for _ in 0..4 {
            a.act(&s).unwrap();
            assert_eq!(a.learn().unwrap(), None);
        }
        // steps 5, 7 and 8 are not multiples of learn_every
        for step in 5..=9u64 {
            a.act(&s).unwrap();
            let out = a.learn().unwrap();
            if step % 3 == 0 {
                assert!(out.is_some(), "expected training at step {}", step);
            } else {
                assert_eq!(out, None, "unexpected training at step {}", step);
            }
        }
    }

    #[test]
    fn learn_not_ready_without_enough_memory() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AgentConfig {
            burnin: 0,
            learn_every: 1,
            batch_size: 4,
            memory_capacity: 10,
            ..config(dir.path())
        };
        let mut a = agent(cfg, vec![0.0; 2]);
        let s = state(2, vec![0, 1]);
        a.cache(s.clone(), s.clone(), 1, 1.0, false);
        a.act(&s).unwrap();
        assert_eq!(a.learn().unwrap(), None);
    }

    #[test]
    fn learn_skips_samples_without_legal_actions() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AgentConfig {
            burnin: 0,
            learn_every: 1,
            batch_size: 2,
            memory_capacity: 2,
            ..config(dir.path())
        };
        let mut a = agent(cfg, vec![0.0; 2]);
        let blocked = state(2, vec![]);
        a.cache(blocked.clone(), blocked.clone(), 0, 1.0, false);
        a.cache(blocked.clone(), blocked.clone(), 0, 1.0, false);
        a.act(&blocked).unwrap();
        assert_eq!(a.learn().unwrap(), None);
    }

    #[test]
    fn learn_reports_mean_q_and_summed_loss() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AgentConfig {
            burnin: 0,
            learn_every: 1,
            batch_size: 2,
            memory_capacity: 2,
            ..config(dir.path())
        };
        let mut a = agent(cfg, vec![1.0, 1.0]);
        let s = state(2, vec![0, 1]);
        let terminal = state(2, vec![]);
        a.cache(s.clone(), terminal.clone(), 0, 0.0, true);
        a.cache(s.clone(), terminal, 1, 0.0, true);
        a.act(&s).unwrap();

        let stats = a.learn().unwrap().unwrap();
        // Each sample: estimate 1.0, target 0.0, squared error 1.0.
        assert_eq!(stats.mean_q, 1.0);
        assert_eq!(stats.loss, 2.0);
    }

    #[test]
    fn learn_checkpoints_on_save_interval() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AgentConfig {
            save_every: 2,
            sync_every: 2,
            ..config(dir.path())
        };
        let mut a = agent(cfg, vec![0.5]);
        let s = state(1, vec![0]);

        a.learn().unwrap();
        assert!(dir.path().join("sched_net_0.chkpt").exists());
        a.act(&s).unwrap();
        a.learn().unwrap();
        assert!(!dir.path().join("sched_net_1.chkpt").exists());
        a.act(&s).unwrap();
        a.learn().unwrap();
        assert!(dir.path().join("sched_net_1.chkpt").exists());
    }

    #[test]
    fn learn_propagates_checkpoint_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();
        let mut a = agent(config(&blocker), vec![]);
        assert!(matches!(a.learn(), Err(AgentError::Io(_))));
    }

    #[test]
    fn save_and_load_restore_exploration_rate() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AgentConfig {
            exploration_rate_decay: 0.5,
            exploration_rate_min: 0.01,
            ..config(dir.path())
        };
        let mut a = agent(cfg.clone(), vec![2.0]);
        let s = state(1, vec![0]);
        a.act(&s).unwrap();
        let path = a.save().unwrap();

        let mut b = agent(cfg, vec![]);
        b.load(&path).unwrap();
        assert_eq!(b.exploration_rate(), 0.5);
        assert_eq!(b.network().online_values(), &[2.0]);
    }

    #[test]
    fn end_to_end_buffer_and_greedy_choice() {
        let dir = tempfile::tempdir().unwrap();

        let mut buf = ReplayBuffer::new(3).unwrap();
        let s = state(1, vec![0]);
        for reward in [1.0, 2.0, 3.0, 4.0] {
            buf.push(Transition {
                state: s.clone(),
                next_state: s.clone(),
                action: 0,
                reward,
                done: false,
            });
        }
        let stored: Vec<f64> = buf.iter().map(|t| t.reward).collect();
        assert!(!stored.contains(&1.0));
        assert_eq!(stored, vec![2.0, 3.0, 4.0]);

        let mut table = vec![0.0; 10];
        table[2] = 0.1;
        table[5] = 0.9;
        table[9] = 0.2;
        let mut a = agent(greedy_config(dir.path()), table);
        let s = state(10, vec![2, 5, 9]);
        assert_eq!(a.act(&s).unwrap(), Some(5));
    }

    #[test]
    fn best_legal_action_prefers_first_on_ties() {
        assert_eq!(best_legal_action(&[1.0, 1.0, 0.5], &[1, 0, 2]).unwrap(), 1);
        assert!(best_legal_action(&[1.0], &[]).is_err());
    }

    #[test]
    fn best_legal_action_rejects_nan_wherever_it_sits() {
        for q in [[1.0, f64::NAN, 0.5], [f64::NAN, 3.0, 0.5], [1.0, 0.5, f64::NAN]] {
            assert!(matches!(
                best_legal_action(&q, &[0, 1, 2]),
                Err(AgentError::Network(_))
            ));
        }
        // Illegal nodes are never ranked.
        assert_eq!(best_legal_action(&[1.0, f64::NAN, 0.5], &[0, 2]).unwrap(), 0);
        assert_eq!(
            best_legal_action(&[f64::NEG_INFINITY, f64::INFINITY], &[0, 1]).unwrap(),
            1
        );
    }

    #[test]
    fn exploit_surfaces_nan_target_q_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = agent(greedy_config(dir.path()), vec![1.0, f64::NAN, 0.5]);
        let s = state(3, vec![0, 1, 2]);
        assert!(matches!(a.act(&s), Err(AgentError::Network(_))));
        assert_eq!(a.curr_step(), 1);
    }

    #[test]
    fn td_target_surfaces_nan_online_q_values() {
        let dir = tempfile::tempdir().unwrap();
        let a = agent(config(dir.path()), vec![f64::NAN, 1.0]);
        let next = state(2, vec![0, 1]);
        assert!(matches!(
            a.td_target(0.0, &next, false),
            Err(AgentError::Network(_))
        ));
        assert_eq!(a.td_target(0.0, &state(2, vec![1]), false).unwrap(), 0.9);
    }

    #[test]
    fn update_q_online_returns_non_finite_loss_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = agent(config(dir.path()), vec![1.0]);
        let s = state(1, vec![0]);

        let est = a.td_estimate(&s, 0).unwrap();
        assert!(a.update_q_online(est, f64::NAN).unwrap().is_nan());

        let mut b = agent(config(dir.path()), vec![1.0]);
        let est = b.td_estimate(&s, 0).unwrap();
        assert_eq!(b.update_q_online(est, f64::INFINITY).unwrap(), f64::INFINITY);
    }

    #[test]
    fn learn_reports_non_finite_loss_as_stats() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AgentConfig {
            burnin: 0,
            learn_every: 1,
            batch_size: 1,
            memory_capacity: 1,
            ..config(dir.path())
        };
        let mut a = agent(cfg, vec![1.0, 1.0]);
        let s = state(2, vec![0, 1]);
        a.cache(s.clone(), state(2, vec![]), 0, f64::NAN, true);
        a.act(&s).unwrap();

        let stats = a.learn().unwrap().unwrap();
        assert!(stats.loss.is_nan());
        assert_eq!(stats.mean_q, 1.0);
    }
}
