#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeUnit {
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Year,
}

pub const ALL_UNITS: [TimeUnit; 9] = [
    TimeUnit::Nanosecond,
    TimeUnit::Microsecond,
    TimeUnit::Millisecond,
    TimeUnit::Second,
    TimeUnit::Minute,
    TimeUnit::Hour,
    TimeUnit::Day,
    TimeUnit::Week,
    TimeUnit::Year,
];

impl TimeUnit {
    pub const fn seconds(self) -> f64 {
        match self {
            TimeUnit::Nanosecond => 1e-9,
            TimeUnit::Microsecond => 1e-6,
            TimeUnit::Millisecond => 1e-3,
            TimeUnit::Second => 1.0,
            TimeUnit::Minute => 60.0,
            TimeUnit::Hour => 3_600.0,
            TimeUnit::Day => 86_400.0,
            TimeUnit::Week => 604_800.0,
            // 365.25 days, so leap years average out
            TimeUnit::Year => 31_557_600.0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            TimeUnit::Nanosecond => "ns",
            TimeUnit::Microsecond => "us",
            TimeUnit::Millisecond => "ms",
            TimeUnit::Second => "s",
            TimeUnit::Minute => "min",
            TimeUnit::Hour => "h",
            TimeUnit::Day => "d",
            TimeUnit::Week => "w",
            TimeUnit::Year => "y",
        }
    }
}

pub fn convert(value: f64, from: TimeUnit, to: TimeUnit) -> f64 {
    value * from.seconds() / to.seconds()
}

pub fn disect(value: f64, unit: TimeUnit, largest: TimeUnit) -> Vec<(TimeUnit, f64)> {
    let mut remaining = value * unit.seconds();
    let mut parts = Vec::new();
    for candidate in ALL_UNITS.iter().rev().copied() {
        if candidate > largest || candidate < unit {
            continue;
        }
        if candidate == unit {
            // smallest unit keeps the (possibly fractional) remainder
            let amount = remaining / candidate.seconds();
            if amount != 0.0 {
                parts.push((candidate, amount));
            }
        } else {
            let amount = (remaining / candidate.seconds()).floor();
            if amount > 0.0 {
                parts.push((candidate, amount));
                remaining -= amount * candidate.seconds();
            }
        }
    }
    parts
}

pub fn format_duration(seconds: f64) -> String {
    let magnitude = seconds.abs();
    let unit = ALL_UNITS
        .iter()
        .rev()
        .copied()
        .find(|unit| magnitude >= unit.seconds())
        .unwrap_or(TimeUnit::Nanosecond);
    format!("{:.2}{}", seconds / unit.seconds(), unit.label())
}
