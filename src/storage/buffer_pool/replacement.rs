//! Replacement policy dispatch: FIFO, LRU, CLOCK, and LRU-K (degenerate to
//! LRU, per the source).

use super::frame::{Frame, FrameTable};

/// Page replacement strategy configured at pool init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementStrategy {
    Fifo,
    Lru,
    Clock,
    /// Behaves identically to `Lru`; history fields are tracked on `Frame`
    /// but never consulted by victim selection.
    LruK,
}

/// Policy bookkeeping that lives alongside the frame table: the CLOCK
/// hand. Kept separate from `FrameTable` since FIFO and LRU don't need
/// one, and the tick counter itself is owned by the pool (shared across
/// strategies, incremented on every load and access).
pub struct ReplacementEngine {
    strategy: ReplacementStrategy,
    clock_hand: usize,
}

impl ReplacementEngine {
    #[must_use]
    pub fn new(strategy: ReplacementStrategy) -> Self {
        Self {
            strategy,
            clock_hand: 0,
        }
    }

    #[must_use]
    pub fn strategy(&self) -> ReplacementStrategy {
        self.strategy
    }

    /// Records a successful pin (hit, or miss-path after load) at logical
    /// time `tick`. Invoked on every successful pin regardless of
    /// strategy; unused history fields are still maintained for fidelity
    /// with the source's bookkeeping.
    pub fn record_access(&self, table: &mut FrameTable, idx: usize, tick: u64) {
        let f = table.frame_mut(idx);
        f.access_tick = tick;
        f.hist[f.k_pos as usize] = tick;
        f.k_pos = (f.k_pos + 1) % 2;
        f.k_count = (f.k_count + 1).min(2);
        f.ref_bit = true;
    }

    /// Initializes a freshly loaded frame's policy metadata. Distinct from
    /// `record_access`: the source sets `loadTick` here and `accessTick`
    /// via the separate `record_access` call that follows on the miss
    /// path, so the shared tick counter advances twice per miss.
    pub fn init_on_load(&self, table: &mut FrameTable, idx: usize, tick: u64) {
        let f = table.frame_mut(idx);
        f.load_tick = tick;
        f.access_tick = tick;
        f.ref_bit = true;
        f.hist = [0; 2];
        f.k_count = 0;
        f.k_pos = 0;
    }

    /// Chooses a victim among frames with `fix_count == 0` and a resident
    /// page, or `None` if no such frame exists. CLOCK mutates ref bits on
    /// second chances as it sweeps.
    pub fn select_victim(&mut self, table: &mut FrameTable) -> Option<usize> {
        match self.strategy {
            ReplacementStrategy::Fifo => Self::min_by_key(table, |f| f.load_tick),
            ReplacementStrategy::Lru | ReplacementStrategy::LruK => {
                Self::min_by_key(table, |f| f.access_tick)
            }
            ReplacementStrategy::Clock => self.clock_sweep(table),
        }
    }

    fn min_by_key(table: &FrameTable, key: impl Fn(&Frame) -> u64) -> Option<usize> {
        (0..table.len())
            .filter(|&i| table.frame(i).is_evictable())
            .min_by_key(|&i| key(table.frame(i)))
    }

    /// Sweeps at most `2N` steps. At each step, an evictable frame with
    /// `ref == 0` is returned as the victim; an evictable frame with
    /// `ref == 1` has its bit cleared (second chance) and the sweep
    /// continues. Exhausting `2N` steps reports `None`.
    fn clock_sweep(&mut self, table: &mut FrameTable) -> Option<usize> {
        let n = table.len();
        if n == 0 {
            return None;
        }

        for _ in 0..(2 * n) {
            let idx = self.clock_hand;
            self.clock_hand = (self.clock_hand + 1) % n;

            let f = table.frame_mut(idx);
            if f.is_evictable() {
                if f.ref_bit {
                    f.ref_bit = false;
                    continue;
                }
                return Some(idx);
            }
        }
        None
    }
}
