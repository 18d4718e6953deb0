use chrono::{Local, NaiveDate};

/// Source of the current date, optionally frozen to a virtual date.
#[derive(Clone, Copy, Debug, Default)]
pub struct Clock {
    virtual_date: Option<NaiveDate>,
}

impl Clock {
    pub fn fixed(date: NaiveDate) -> Self {
        Self {
            virtual_date: Some(date),
        }
    }

    pub fn new(virtual_date: Option<NaiveDate>) -> Self {
        Self { virtual_date }
    }

    pub fn today(&self) -> NaiveDate {
        self.virtual_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

#[test]
fn test_fixed_clock() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    assert_eq!(Clock::fixed(date).today(), date);
    assert_eq!(Clock::new(Some(date)).today(), date);
}
