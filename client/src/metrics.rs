//! Terminal statistics of a stress run and their tabular export.

use crate::receiver::ReceiveStats;
use crate::session::SimulationStats;
use crate::tick_tracker::LossReport;
use shared::message::ClientId;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Final figures of one session that completed its handshake.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientReport {
    /// Launch order, starting at 1.
    pub client_num: usize,
    /// Id assigned by the authority.
    pub session_id: ClientId,
    pub updates_sent: u64,
    pub pings_sent: u64,
    pub send_failures: u64,
    pub loss: LossReport,
    pub avg_packet_size: f64,
    pub final_position: (i32, i32),
}

impl ClientReport {
    pub fn new(
        client_num: usize,
        session_id: ClientId,
        sim: &SimulationStats,
        recv: &ReceiveStats,
    ) -> Self {
        Self {
            client_num,
            session_id,
            updates_sent: sim.updates_sent,
            pings_sent: sim.pings_sent,
            send_failures: sim.send_failures,
            loss: recv.tracker.compute_loss(),
            avg_packet_size: recv.avg_packet_size(),
            final_position: sim.final_position,
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "[Client {}] Updates Sent: {}, Ticks Expected: {}, Received: {}, Loss: {:.2}%",
            self.client_num,
            self.updates_sent,
            self.loss.expected,
            self.loss.received,
            self.loss.loss_percent
        )
    }
}

/// A session abandoned before producing figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFailure {
    pub client_num: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub clients: usize,
    pub failed: usize,
    pub total_updates: u64,
    pub total_pings: u64,
    pub total_send_failures: u64,
    pub mean_loss_percent: f64,
    pub worst_loss_percent: f64,
}

/// Collects the outcome of every client of a run.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    reports: Vec<ClientReport>,
    failures: Vec<ClientFailure>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: ClientReport) {
        self.reports.push(report);
    }

    pub fn record_failure(&mut self, client_num: usize, reason: impl Into<String>) {
        self.failures.push(ClientFailure {
            client_num,
            reason: reason.into(),
        });
    }

    /// Reports ordered by launch number.
    pub fn reports(&self) -> Vec<&ClientReport> {
        let mut reports: Vec<&ClientReport> = self.reports.iter().collect();
        reports.sort_by_key(|r| r.client_num);
        reports
    }

    pub fn failures(&self) -> &[ClientFailure] {
        &self.failures
    }

    pub fn summary(&self) -> RunSummary {
        let total_updates = self.reports.iter().map(|r| r.updates_sent).sum();
        let total_pings = self.reports.iter().map(|r| r.pings_sent).sum();
        let total_send_failures = self.reports.iter().map(|r| r.send_failures).sum();
        let mean_loss_percent = if self.reports.is_empty() {
            0.0
        } else {
            self.reports.iter().map(|r| r.loss.loss_percent).sum::<f64>() / self.reports.len() as f64
        };
        let worst_loss_percent = self
            .reports
            .iter()
            .map(|r| r.loss.loss_percent)
            .fold(0.0, f64::max);

        RunSummary {
            clients: self.reports.len() + self.failures.len(),
            failed: self.failures.len(),
            total_updates,
            total_pings,
            total_send_failures,
            mean_loss_percent,
            worst_loss_percent,
        }
    }

    /// `ClientID,UpdatesSent,TicksExpected,TicksReceived,LossPercentage`
    pub fn write_loss_table<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "ClientID,UpdatesSent,TicksExpected,TicksReceived,LossPercentage")?;
        for r in self.reports() {
            writeln!(
                out,
                "{},{},{},{},{}",
                r.client_num, r.updates_sent, r.loss.expected, r.loss.received, r.loss.loss_percent
            )?;
        }
        Ok(())
    }

    /// `ClientID,AvgPacketSizeBytes`
    pub fn write_packet_size_table<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "ClientID,AvgPacketSizeBytes")?;
        for r in self.reports() {
            writeln!(out, "{},{}", r.client_num, r.avg_packet_size)?;
        }
        Ok(())
    }

    /// Writes `loss_clients_<N>.csv` and `packet_sizes_<N>.csv` into `dir`,
    /// where N is the number of launched clients.
    pub fn export_csv(&self, dir: &Path) -> io::Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir)?;
        let clients = self.summary().clients;

        let loss_path = dir.join(format!("loss_clients_{}.csv", clients));
        let mut loss_file = BufWriter::new(File::create(&loss_path)?);
        self.write_loss_table(&mut loss_file)?;
        loss_file.flush()?;

        let sizes_path = dir.join(format!("packet_sizes_{}.csv", clients));
        let mut sizes_file = BufWriter::new(File::create(&sizes_path)?);
        self.write_packet_size_table(&mut sizes_file)?;
        sizes_file.flush()?;

        Ok((loss_path, sizes_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(client_num: usize, updates_sent: u64, loss_percent: f64) -> ClientReport {
        ClientReport {
            client_num,
            session_id: client_num as ClientId + 100,
            updates_sent,
            pings_sent: 3,
            send_failures: 0,
            loss: LossReport {
                expected: 4,
                received: 3,
                loss_percent,
            },
            avg_packet_size: 42.5,
            final_position: (0, 0),
        }
    }

    #[test]
    fn test_summary_line_format() {
        assert_eq!(
            report(3, 97, 25.0).summary_line(),
            "[Client 3] Updates Sent: 97, Ticks Expected: 4, Received: 3, Loss: 25.00%"
        );
    }

    #[test]
    fn test_summary_counts_failures() {
        let mut metrics = MetricsAggregator::new();
        metrics.record(report(1, 10, 0.0));
        metrics.record(report(2, 20, 50.0));
        metrics.record_failure(3, "no welcome");

        let summary = metrics.summary();
        assert_eq!(summary.clients, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total_updates, 30);
        assert_eq!(summary.total_pings, 6);
        assert_eq!(summary.total_send_failures, 0);
        assert_eq!(summary.mean_loss_percent, 25.0);
        assert_eq!(summary.worst_loss_percent, 50.0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = MetricsAggregator::new().summary();
        assert_eq!(summary.clients, 0);
        assert_eq!(summary.mean_loss_percent, 0.0);
    }

    #[test]
    fn test_tables_are_ordered_by_launch() {
        let mut metrics = MetricsAggregator::new();
        metrics.record(report(2, 20, 25.0));
        metrics.record(report(1, 10, 0.0));

        let mut loss = Vec::new();
        metrics.write_loss_table(&mut loss).unwrap();
        assert_eq!(
            String::from_utf8(loss).unwrap(),
            "ClientID,UpdatesSent,TicksExpected,TicksReceived,LossPercentage\n\
             1,10,4,3,0\n\
             2,20,4,3,25\n"
        );

        let mut sizes = Vec::new();
        metrics.write_packet_size_table(&mut sizes).unwrap();
        assert_eq!(
            String::from_utf8(sizes).unwrap(),
            "ClientID,AvgPacketSizeBytes\n1,42.5\n2,42.5\n"
        );
    }

    #[test]
    fn test_export_csv_names_files_by_client_count() {
        let dir = std::env::temp_dir().join(format!("tickstress-metrics-{}", std::process::id()));
        let mut metrics = MetricsAggregator::new();
        metrics.record(report(1, 10, 0.0));
        metrics.record_failure(2, "invalid welcome");

        let (loss, sizes) = metrics.export_csv(&dir).unwrap();
        assert!(loss.ends_with("loss_clients_2.csv"));
        assert!(sizes.ends_with("packet_sizes_2.csv"));
        assert!(fs::read_to_string(&loss).unwrap().starts_with("ClientID,UpdatesSent"));

        let _ = fs::remove_dir_all(&dir);
    }
}
