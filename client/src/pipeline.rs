/// Bookkeeping for deferred (pipelined) sends on the active connection.
///
/// `pending` counts commands written since the last flush and drives the auto flush threshold.
/// `outstanding` counts replies the server owes us, which is what [`PipelineState::record_receive`]
/// checks against.
///
/// The state is plain data mutated through `&mut self`. A client owning it serves one logical
/// caller at a time; callers wanting concurrency take independent clients from a shared pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineState {
    active: bool,
    auto_flush_threshold: u32,
    pending: u32,
    outstanding: u32,
}

impl PipelineState {
    /// Switch to deferred mode. A threshold of 0 disables auto flushing
    pub fn enable(&mut self, auto_flush_threshold: u32) {
        self.active = true;
        self.auto_flush_threshold = auto_flush_threshold;
        self.pending = 0;
    }

    /// Switch back to immediate mode. The caller is expected to have flushed first
    pub fn disable(&mut self) {
        self.active = false;
        self.auto_flush_threshold = 0;
        self.pending = 0;
    }

    /// Record one deferred send. Returns true when the threshold was reached and the buffered
    /// commands must now be flushed
    pub fn record_send(&mut self) -> bool {
        self.pending += 1;
        self.outstanding += 1;
        self.auto_flush_threshold != 0 && self.pending >= self.auto_flush_threshold
    }

    pub fn flushed(&mut self) {
        self.pending = 0;
    }

    /// Consume one owed reply, false when nothing is owed
    pub fn record_receive(&mut self) -> bool {
        if self.outstanding == 0 {
            return false;
        }
        self.outstanding -= 1;
        true
    }

    /// Forget every owed reply, used after draining or when the connection is dropped
    pub fn clear_outstanding(&mut self) {
        self.outstanding = 0;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn auto_flush_threshold(&self) -> u32 {
        self.auto_flush_threshold
    }

    /// Commands sent since the last flush
    pub fn pending(&self) -> u32 {
        self.pending
    }

    /// Replies sent by the server and not yet received
    pub fn outstanding(&self) -> u32 {
        self.outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_triggers_flush() {
        let mut state = PipelineState::default();
        state.enable(3);
        assert!(!state.record_send());
        assert!(!state.record_send());
        assert!(state.record_send());
        state.flushed();
        assert_eq!(state.pending(), 0);
        assert_eq!(state.outstanding(), 3);
    }

    #[test]
    fn test_zero_threshold_never_flushes() {
        let mut state = PipelineState::default();
        state.enable(0);
        for _ in 0..100 {
            assert!(!state.record_send());
        }
        assert_eq!(state.pending(), 100);
    }

    #[test]
    fn test_receive_is_bounded_by_sends() {
        let mut state = PipelineState::default();
        state.enable(2);
        state.record_send();
        assert!(state.record_receive());
        assert!(!state.record_receive());
    }

    #[test]
    fn test_disable_resets() {
        let mut state = PipelineState::default();
        state.enable(5);
        state.record_send();
        state.flushed();
        state.disable();
        assert!(!state.is_active());
        assert_eq!(state.pending(), 0);
        assert_eq!(state.auto_flush_threshold(), 0);
        // replies already owed survive the mode switch
        assert_eq!(state.outstanding(), 1);
    }
}
