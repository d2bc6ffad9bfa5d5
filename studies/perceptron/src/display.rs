use crate::judge::SubmissionJudge;
use crate::train::Millis;

/// Fixed point formatting with thousands separators: `format_fixed(123456, 3)`
/// gives `"123.456"`, `format_fixed(1234567, 3)` gives `"1,234.567"`.
pub fn format_fixed(value: u64, decimals: u32) -> String {
    let divisor = 10u64.pow(decimals);
    let whole = group_thousands(value / divisor);
    if decimals == 0 {
        whole
    } else {
        format!("{}.{:0width$}", whole, value % divisor, width = decimals as usize)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Milliseconds shown as seconds.
pub fn format_time(time: Millis) -> String {
    format_fixed(time, 3)
}

/// Hundredths shown as a two-decimal factor.
pub fn format_factor(factor: u32) -> String {
    format_fixed(factor as u64, 2)
}

/// The six text readouts of the device.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DisplayPanel {
    pub current_accuracy: String,
    pub current_time: String,
    pub convergence_rate: String,
    pub connection_delay: String,
    pub required_accuracy: String,
    pub max_time: String,
}

impl DisplayPanel {
    pub fn show_idle(&mut self, judge: &SubmissionJudge) {
        self.current_accuracy = "-".to_string();
        self.current_time = "-".to_string();
        self.convergence_rate = "/".to_string();
        self.connection_delay = "/".to_string();
        self.required_accuracy = judge.required_accuracy.to_string();
        self.max_time = format_time(judge.max_time);
    }

    pub fn show_connection(&mut self, convergence_rate: u32, connection_delay: u32) {
        self.current_accuracy.clear();
        self.current_time.clear();
        self.convergence_rate = format_factor(convergence_rate);
        self.connection_delay = format_factor(connection_delay);
        self.required_accuracy.clear();
        self.max_time.clear();
    }

    pub fn show_training(&mut self, accuracy: u32, time: Millis) {
        self.current_accuracy = accuracy.to_string();
        self.current_time = format_time(time);
    }
}
