use super::types::TripStatus;

/// Decision taken at the checkpoint after cost accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Success,
    Recalculate,
    Halt,
}

pub struct RoutingPolicy;

impl RoutingPolicy {
    pub fn decide(status: TripStatus) -> Route {
        match status {
            TripStatus::WithinBudget => Route::Success,
            TripStatus::OverBudget => Route::Recalculate,
            TripStatus::Started
            | TripStatus::PlanningComplete
            | TripStatus::FlightsFound
            | TripStatus::HotelsFound
            | TripStatus::ActivitiesFound
            | TripStatus::Error
            | TripStatus::BudgetUnreachable
            | TripStatus::Cancelled => Route::Halt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finders::cost::budget_status;

    #[test]
    fn budget_statuses_route_to_success_or_recalculate() {
        assert_eq!(RoutingPolicy::decide(TripStatus::WithinBudget), Route::Success);
        assert_eq!(RoutingPolicy::decide(TripStatus::OverBudget), Route::Recalculate);
    }

    #[test]
    fn other_statuses_halt() {
        for status in [
            TripStatus::Started,
            TripStatus::PlanningComplete,
            TripStatus::FlightsFound,
            TripStatus::HotelsFound,
            TripStatus::ActivitiesFound,
            TripStatus::Error,
            TripStatus::BudgetUnreachable,
            TripStatus::Cancelled,
        ] {
            assert_eq!(RoutingPolicy::decide(status), Route::Halt, "{status}");
        }
    }

    #[test]
    fn equal_total_and_budget_is_success() {
        let pairs = [
            (3250.0, 3250.0, Route::Success),
            (0.0, 0.0, Route::Success),
            (3250.0, 8000.0, Route::Success),
            (3250.01, 3250.0, Route::Recalculate),
            (2050.0, 500.0, Route::Recalculate),
        ];
        for (total, budget, expected) in pairs {
            assert_eq!(
                RoutingPolicy::decide(budget_status(total, budget)),
                expected,
                "total {total} budget {budget}"
            );
        }
    }
}
