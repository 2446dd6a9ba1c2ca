//! Resident-memory probe used by the recrawl ceiling check.

use std::fs;

/// Reports the process's resident set size. A probe that cannot read the
/// value reports 0, which never trips the ceiling.
pub trait MemoryProbe: Send + Sync {
    fn resident_bytes(&self) -> u64;
}

/// Reads `VmRSS` from `/proc/self/status` on Linux; reports 0 elsewhere.
/// The kernel reports the value in kB, so no page-size assumption is needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcMemoryProbe;

impl MemoryProbe for ProcMemoryProbe {
    fn resident_bytes(&self) -> u64 {
        fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|status| parse_vm_rss_kb(&status))
            .map_or(0, |kb| kb * 1024)
    }
}

fn parse_vm_rss_kb(status: &str) -> Option<u64> {
    status
        .lines()
        .find(|line| line.starts_with("VmRSS:"))?
        .split_whitespace()
        .nth(1)?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vm_rss_line() {
        let status = "VmPeak:\t  20000 kB\nVmRSS:\t  16432 kB\nVmData:\t   9000 kB\n";
        assert_eq!(parse_vm_rss_kb(status), Some(16432));
    }

    #[test]
    fn missing_or_garbled_field_reads_as_none() {
        assert_eq!(parse_vm_rss_kb("VmPeak:\t 20000 kB\n"), None);
        assert_eq!(parse_vm_rss_kb("VmRSS: garbage\n"), None);
    }

    #[test]
    fn probe_never_panics() {
        let probe = ProcMemoryProbe;
        // On Linux this is nonzero; elsewhere the fallback is 0.
        let _ = probe.resident_bytes();
    }
}
