use std::fmt;

use listset_core::SetKind;

/// Number of threads assigned to each operation class.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ClassCounts {
    pub add: usize,
    pub remove: usize,
    pub contains: usize,
}

/// Result of one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub kind: SetKind,
    pub threads: usize,
    pub classes: ClassCounts,
    /// Sum of every thread's own wall-clock time.
    pub total_nanos: u128,
    pub total_operations: u64,
}

impl BenchReport {
    /// Operations per second of summed thread time.
    pub fn throughput(&self) -> f64 {
        let seconds = self.total_nanos as f64 / 1_000_000_000.0;
        if seconds == 0.0 {
            return 0.0;
        }
        self.total_operations as f64 / seconds
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Execution Time (ns): {}", self.total_nanos)?;
        writeln!(f, "Total Operations: {}", self.total_operations)?;
        write!(f, "Throughput (operations per second): {}", self.throughput())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(total_nanos: u128) -> BenchReport {
        BenchReport {
            kind: SetKind::Lazy,
            threads: 2,
            classes: ClassCounts { add: 1, remove: 1, contains: 0 },
            total_nanos,
            total_operations: 20_000,
        }
    }

    #[test]
    fn test_throughput_uses_summed_time() {
        // 20k operations over 2 seconds of thread time
        assert_eq!(report(2_000_000_000).throughput(), 10_000.0);
    }

    #[test]
    fn test_zero_time_has_zero_throughput() {
        assert_eq!(report(0).throughput(), 0.0);
    }

    #[test]
    fn test_display_lines() {
        let text = report(4_000_000_000).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Total Execution Time (ns): 4000000000",
                "Total Operations: 20000",
                "Throughput (operations per second): 5000",
            ]
        );
    }
}
