use super::*;

/// Outcome of feeding a cumulative move list to a [`Tracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// New moves were replayed; the count is now `applied`.
    Moved { applied: usize, rejected: usize },
    /// Same length as what was already applied.
    Unchanged,
    /// Shorter than what was already applied; nothing touched.
    Stale { reported: usize, applied: usize },
}

/// Replays one game's move list exactly once per move index.
///
/// `applied` only grows: every move index below it has been offered to the
/// rules engine (played or rejected) and is never offered again.
#[derive(Debug, Clone, Default)]
pub struct Tracker<R = Standard> {
    rules: R,
    applied: usize,
}

impl<R: Rules> Tracker<R> {
    pub fn new(rules: R) -> Self {
        Self { rules, applied: 0 }
    }

    /// Restart from `initial`, or from the standard position when absent or
    /// unreadable, and replay the whole list.
    pub fn restart(&mut self, initial: Option<&str>, moves: &[&str]) -> Advance {
        match initial {
            None => self.rules.reset(),
            Some(fen) => {
                if let Err(e) = self.rules.load(fen) {
                    log::warn!("{}, using standard position", e);
                    self.rules.reset();
                }
            }
        }
        self.applied = 0;
        match self.advance(moves) {
            Advance::Unchanged => Advance::Moved {
                applied: 0,
                rejected: 0,
            },
            moved => moved,
        }
    }

    /// Replay only the suffix of `moves` past what was already applied.
    pub fn advance(&mut self, moves: &[&str]) -> Advance {
        match moves.len().cmp(&self.applied) {
            std::cmp::Ordering::Less => Advance::Stale {
                reported: moves.len(),
                applied: self.applied,
            },
            std::cmp::Ordering::Equal => Advance::Unchanged,
            std::cmp::Ordering::Greater => {
                let rejected = moves[self.applied..]
                    .iter()
                    .filter_map(|m| self.rules.play(m).err())
                    .inspect(|e| log::warn!("{}", e))
                    .count();
                self.applied = moves.len();
                Advance::Moved {
                    applied: self.applied,
                    rejected,
                }
            }
        }
    }

    pub fn applied(&self) -> usize {
        self.applied
    }
    pub fn fen(&self) -> String {
        self.rules.fen()
    }
    pub fn legal(&self) -> Vec<String> {
        self.rules.legal()
    }
}
