use chrono::NaiveDate;
use olosuashi_shared::{AvailabilityWindow, Tour};

/// Departure calendar of one tour, built from its availability windows
pub struct AvailabilityCalendar<'a> {
    windows: Vec<&'a AvailabilityWindow>,
    min_group_size: u32,
}

impl<'a> AvailabilityCalendar<'a> {
    pub fn for_tour(tour: &'a Tour) -> Self {
        Self::new(&tour.availability, tour.min_group_size)
    }

    pub fn new(windows: &'a [AvailabilityWindow], min_group_size: u32) -> Self {
        let mut windows: Vec<&AvailabilityWindow> = windows
            .iter()
            .filter(|w| w.start_date <= w.end_date)
            .collect();
        windows.sort_by_key(|w| w.start_date);
        Self { windows, min_group_size }
    }

    /// Window covering `date`, inclusive on both ends.
    pub fn window_for(&self, date: NaiveDate) -> Option<&'a AvailabilityWindow> {
        self.windows
            .iter()
            .copied()
            .find(|w| w.start_date <= date && date <= w.end_date)
    }

    pub fn check(
        &self,
        date: NaiveDate,
        travelers: u32,
    ) -> Result<&'a AvailabilityWindow, AvailabilityError> {
        if travelers < self.min_group_size {
            return Err(AvailabilityError::BelowMinimum {
                requested: travelers,
                minimum: self.min_group_size,
            });
        }

        let window = self
            .window_for(date)
            .ok_or(AvailabilityError::NoDeparture(date))?;

        if window.slots < travelers {
            return Err(AvailabilityError::InsufficientSlots {
                requested: travelers,
                available: window.slots,
            });
        }

        Ok(window)
    }

    /// Earliest date on or after `from` that can take the whole party.
    pub fn next_available(&self, from: NaiveDate, travelers: u32) -> Option<NaiveDate> {
        if travelers < self.min_group_size {
            return None;
        }
        self.windows
            .iter()
            .filter(|w| w.end_date >= from && w.slots >= travelers)
            .map(|w| w.start_date.max(from))
            .min()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AvailabilityError {
    #[error("No departure on {0}")]
    NoDeparture(NaiveDate),

    #[error("Only {available} places left, {requested} requested")]
    InsufficientSlots {
        requested: u32,
        available: u32,
    },

    #[error("Minimum group size is {minimum}, {requested} requested")]
    BelowMinimum {
        requested: u32,
        minimum: u32,
    },
}
