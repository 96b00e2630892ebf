use std::fmt;
use std::time::Duration;

/// Counters gathered during one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Frontier pops, including the final pop of the goal.
    pub expansions: usize,
    pub pushes: usize,
    pub max_frontier: usize,
    pub elapsed: Duration,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Expansions: {}", self.expansions)?;
        writeln!(f, "Frontier pushes: {}", self.pushes)?;
        writeln!(f, "Peak frontier size: {}", self.max_frontier)?;
        writeln!(f, "Search time: {:.2?}", self.elapsed)?;
        Ok(())
    }
}

/// Summary of a CLI run: the engine's result next to the reference cost.
#[derive(Debug, Clone)]
pub struct Report {
    pub grid_size: usize,
    pub barriers: usize,
    pub found: bool,
    pub cancelled: bool,
    pub path_cost: usize,
    /// Optimal cost according to the `pathfinding` crate, `None` if it found
    /// no route either.
    pub reference_cost: Option<usize>,
    pub stats: SearchStats,
}

impl Report {
    /// Path cost divided by the reference cost; 1.0 is optimal.
    pub fn route_ratio(&self) -> Option<f64> {
        match self.reference_cost {
            Some(reference) if self.found && reference > 0 => {
                Some(self.path_cost as f64 / reference as f64)
            }
            _ => None,
        }
    }

    pub fn matches_reference(&self) -> bool {
        if self.cancelled {
            return true;
        }
        match self.reference_cost {
            Some(reference) => self.found && self.path_cost == reference,
            None => !self.found,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid: {0}x{0}, barriers: {1}", self.grid_size, self.barriers)?;
        if self.cancelled {
            writeln!(f, "Result: cancelled")?;
        } else if self.found {
            writeln!(f, "Result: path found, {} steps", self.path_cost)?;
        } else {
            writeln!(f, "Result: no path")?;
        }
        match self.reference_cost {
            Some(cost) => writeln!(f, "Reference optimal cost: {}", cost)?,
            None => writeln!(f, "Reference optimal cost: unreachable")?,
        }
        if let Some(ratio) = self.route_ratio() {
            writeln!(f, "Route ratio: {:.3}", ratio)?;
        }
        write!(f, "{}", self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(found: bool, path_cost: usize, reference_cost: Option<usize>) -> Report {
        Report {
            grid_size: 5,
            barriers: 0,
            found,
            cancelled: false,
            path_cost,
            reference_cost,
            stats: SearchStats::default(),
        }
    }

    #[test]
    fn matches_reference_when_costs_agree() {
        assert!(report(true, 8, Some(8)).matches_reference());
        assert!(!report(true, 10, Some(8)).matches_reference());
        assert!(report(false, 0, None).matches_reference());
        assert!(!report(false, 0, Some(4)).matches_reference());
    }

    #[test]
    fn route_ratio_needs_a_found_path() {
        assert_eq!(report(true, 8, Some(8)).route_ratio(), Some(1.0));
        assert_eq!(report(false, 0, Some(8)).route_ratio(), None);
    }

    #[test]
    fn display_lists_result_and_counters() {
        let text = report(true, 8, Some(8)).to_string();
        assert!(text.contains("path found, 8 steps"));
        assert!(text.contains("Reference optimal cost: 8"));
        assert!(text.contains("Expansions: 0"));
    }
}
