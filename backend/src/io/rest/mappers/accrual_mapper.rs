use shared::{
    AccrualOutcome as SharedAccrualOutcome, AccrualReport as SharedAccrualReport,
    GoalCredit as SharedGoalCredit, GoalReset as SharedGoalReset,
    GoalWriteFailure as SharedGoalWriteFailure, SweepResponse,
};

use super::format_timestamp;
use crate::domain::commands::sessions::AccrualOutcome;
use crate::domain::goal_accrual::{AccrualReport, GoalWriteFailure, SweepReport};

pub struct AccrualMapper;

impl AccrualMapper {
    pub fn report_to_dto(report: AccrualReport) -> SharedAccrualReport {
        SharedAccrualReport {
            category: report.category,
            amount: report.amount,
            credited: report
                .credited
                .into_iter()
                .map(|c| SharedGoalCredit {
                    goal_id: c.goal_id,
                    previous: c.previous,
                    current: c.current,
                    was_reset: c.was_reset,
                })
                .collect(),
            failures: Self::failures_to_dto(report.failures),
        }
    }

    pub fn outcome_to_dto(outcome: AccrualOutcome) -> SharedAccrualOutcome {
        match outcome {
            AccrualOutcome::Applied(report) => SharedAccrualOutcome::Applied { report: Self::report_to_dto(report) },
            AccrualOutcome::Skipped => SharedAccrualOutcome::Skipped,
            AccrualOutcome::Failed(message) => SharedAccrualOutcome::Failed { message },
        }
    }

    pub fn sweep_to_dto(report: SweepReport) -> SweepResponse {
        SweepResponse {
            reset: report
                .reset
                .into_iter()
                .map(|r| SharedGoalReset {
                    goal_id: r.goal_id,
                    previous: r.previous,
                    reset_at: format_timestamp(r.reset_at),
                })
                .collect(),
            failures: Self::failures_to_dto(report.failures),
        }
    }

    fn failures_to_dto(failures: Vec<GoalWriteFailure>) -> Vec<SharedGoalWriteFailure> {
        failures
            .into_iter()
            .map(|f| SharedGoalWriteFailure { goal_id: f.goal_id, reason: f.reason })
            .collect()
    }
}
