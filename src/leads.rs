// ECGWatch — Lead-Off Monitor
//
// The AD8232 drives LO+ / LO- high while the matching electrode has no skin
// contact. There is no debounce: every flip of the lines is a transition.

/// Raw level of the two lead-off sense lines (`true` = line reads HIGH).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeadLines {
    pub lo_plus: bool,
    pub lo_minus: bool,
}

impl LeadLines {
    pub const SEATED: Self = Self { lo_plus: false, lo_minus: false };
    pub const OFF: Self = Self { lo_plus: true, lo_minus: true };

    pub fn both_seated(&self) -> bool {
        !self.lo_plus && !self.lo_minus
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadTransition {
    Connected,
    Disconnected,
}

#[derive(Debug, Default)]
pub struct LeadOffMonitor {
    connected: bool,
}

impl LeadOffMonitor {
    /// Starts in the disconnected state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update from the current line levels. Returns the new connection state
    /// and the edge, if the state changed.
    pub fn check(&mut self, lines: LeadLines) -> (bool, Option<LeadTransition>) {
        let connected = lines.both_seated();
        if connected == self.connected {
            return (connected, None);
        }

        self.connected = connected;
        let edge = if connected {
            log::info!("Leads connected");
            LeadTransition::Connected
        } else {
            log::info!("Leads off (LO+:{} LO-:{})", lines.lo_plus, lines.lo_minus);
            LeadTransition::Disconnected
        };
        (connected, Some(edge))
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_lines_low_means_connected() {
        let mut monitor = LeadOffMonitor::new();
        assert!(!monitor.is_connected());

        let (connected, edge) = monitor.check(LeadLines::SEATED);
        assert!(connected);
        assert_eq!(edge, Some(LeadTransition::Connected));

        let (connected, edge) = monitor.check(LeadLines::SEATED);
        assert!(connected);
        assert_eq!(edge, None);
    }

    #[test]
    fn either_line_high_means_disconnected() {
        for lines in [
            LeadLines { lo_plus: true, lo_minus: false },
            LeadLines { lo_plus: false, lo_minus: true },
            LeadLines::OFF,
        ] {
            let mut monitor = LeadOffMonitor::new();
            monitor.check(LeadLines::SEATED);
            let (connected, edge) = monitor.check(lines);
            assert!(!connected);
            assert_eq!(edge, Some(LeadTransition::Disconnected));
        }
    }

    #[test]
    fn staying_off_reports_no_edge() {
        let mut monitor = LeadOffMonitor::new();
        assert_eq!(monitor.check(LeadLines::OFF), (false, None));
        assert_eq!(monitor.check(LeadLines::OFF), (false, None));
    }

    #[test]
    fn flapping_lines_report_every_edge() {
        let mut monitor = LeadOffMonitor::new();
        let mut edges = 0;
        for i in 0..10 {
            let lines = if i % 2 == 0 { LeadLines::SEATED } else { LeadLines::OFF };
            if monitor.check(lines).1.is_some() {
                edges += 1;
            }
        }
        assert_eq!(edges, 10);
    }
}
