//! Episode loop tying the agent, an environment and the metric logger together.

use rand::Rng;

use crate::error::AgentError;
use crate::rl::agent::{Agent, NO_ACTION};
use crate::rl::environment::Environment;
use crate::rl::metrics::MetricLogger;
use crate::rl::network::QNetwork;

/// Episode driver for DQN training.
#[derive(Debug, Clone)]
pub struct Trainer {
    /// Number of episodes to run.
    pub episodes: usize,
    /// Episodes between [`MetricLogger::record`] calls.
    pub record_every: usize,
    /// Hard cap on steps per episode, for environments that may never finish.
    pub max_steps_per_episode: Option<usize>,
}

impl Default for Trainer {
    fn default() -> Self {
        Self {
            episodes: 100,
            record_every: 20,
            max_steps_per_episode: None,
        }
    }
}

impl Trainer {
    /// Runs the training loop.
    ///
    /// Each step: act, step the environment, cache the transition, learn,
    /// log. Returns the total reward of every episode.
    ///
    /// # Errors
    ///
    /// Checkpoint, log and network errors abort training.
    pub fn run<N, R, E>(
        &self,
        agent: &mut Agent<N, R>,
        env: &mut E,
        logger: &mut MetricLogger,
    ) -> Result<Vec<f64>, AgentError>
    where
        N: QNetwork,
        R: Rng,
        E: Environment,
    {
        if self.record_every == 0 {
            return Err(AgentError::Config(
                "record_every must be positive".to_string(),
            ));
        }

        let mut episode_rewards = Vec::with_capacity(self.episodes);
        for episode in 0..self.episodes {
            let mut state = env.reset();
            let mut total_reward = 0.0;
            let mut steps = 0usize;

            loop {
                let action = agent.act(&state)?.unwrap_or(NO_ACTION);
                let outcome = env.step(action);
                agent.cache(
                    state,
                    outcome.next_state.clone(),
                    action,
                    outcome.reward,
                    outcome.done,
                );

                let learned = agent.learn()?;
                logger.log_step(outcome.reward, learned);
                total_reward += outcome.reward;
                steps += 1;

                state = outcome.next_state;
                let capped = self.max_steps_per_episode.is_some_and(|max| steps >= max);
                if outcome.done || capped {
                    break;
                }
            }

            logger.log_episode();
            episode_rewards.push(total_reward);

            if episode % self.record_every == 0 {
                logger.record(episode, agent.exploration_rate(), agent.curr_step())?;
            }
        }

        Ok(episode_rewards)
    }
}
