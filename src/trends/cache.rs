//! Memoized analyses.
//!
//! Analyses are pure, so a result can be reused whenever the exact same
//! inputs come back (e.g. a chart redrawn without new data). Keys hold the
//! full input content rather than a digest, so a hit is always identical to
//! a fresh computation.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::analysis::{AnalysisOptions, TrendAnalysis, TrendAnalyzer};
use super::error::TrendResult;
use super::series::RawSample;

/// Exact content of one analysis call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AnalysisKey {
    samples: Vec<(Option<DateTime<Utc>>, Option<u64>)>,
    goal: u64,
    project_at: Option<DateTime<Utc>>,
}

impl AnalysisKey {
    fn new(samples: &[RawSample], goal: f64, options: &AnalysisOptions) -> Self {
        Self {
            samples: samples
                .iter()
                .map(|s| (s.timestamp, s.value.map(f64::to_bits)))
                .collect(),
            goal: goal.to_bits(),
            project_at: options.project_at,
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<AnalysisKey, TrendAnalysis>,
    /// Insertion order, oldest first
    order: VecDeque<AnalysisKey>,
    hits: u64,
    misses: u64,
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Bounded memoizing wrapper around a [`TrendAnalyzer`].
#[derive(Debug)]
pub struct AnalysisCache {
    analyzer: TrendAnalyzer,
    capacity: usize,
    state: Mutex<CacheState>,
}

impl AnalysisCache {
    /// Wrap an analyzer; capacity comes from its configuration.
    pub fn new(analyzer: TrendAnalyzer) -> Self {
        let capacity = analyzer.config().cache_capacity;
        Self::with_capacity(analyzer, capacity)
    }

    /// Wrap an analyzer with an explicit capacity.
    pub fn with_capacity(analyzer: TrendAnalyzer, capacity: usize) -> Self {
        Self {
            analyzer,
            capacity,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Wrapped analyzer.
    pub fn analyzer(&self) -> &TrendAnalyzer {
        &self.analyzer
    }

    /// Analyse, reusing a previous result for identical inputs.
    ///
    /// Errors are returned as-is and never cached.
    pub fn analyze(
        &self,
        samples: &[RawSample],
        goal: f64,
        options: &AnalysisOptions,
    ) -> TrendResult<TrendAnalysis> {
        let key = AnalysisKey::new(samples, goal, options);

        {
            let mut state = self.lock();
            let cached = state.entries.get(&key).cloned();
            if let Some(found) = cached {
                state.hits += 1;
                return Ok(found);
            }
            state.misses += 1;
        }

        let analysis = self.analyzer.analyze(samples, goal, options)?;
        self.insert(key, analysis.clone());
        Ok(analysis)
    }

    fn insert(&self, key: AnalysisKey, analysis: TrendAnalysis) {
        if self.capacity == 0 {
            return;
        }

        let mut state = self.lock();
        if state.entries.contains_key(&key) {
            return;
        }

        while state.entries.len() >= self.capacity {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            state.entries.remove(&oldest);
        }

        state.order.push_back(key.clone());
        state.entries.insert(key, analysis);
    }

    /// Get number of cached analyses.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached analysis and reset the counters.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
        state.hits = 0;
        state.misses = 0;
    }

    /// Current hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Entries are inserted whole; a poisoned map is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(TrendAnalyzer::default())
    }
}
