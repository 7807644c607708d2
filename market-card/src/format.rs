use chrono::{DateTime, Local};
use thousands::Separable;

use crate::{
    config::{Labels, RelativeTimeLabels},
    model::MarketScope,
};

/// Groups digits in threes, `1234567` -> `1,234,567`.
pub fn readable_number(value: u64) -> String {
    value.separate_with_commas()
}

/// How long before `now` the instant `then` was, in the largest whole unit.
/// Instants in the future read as just now.
pub fn relative_time(
    then: DateTime<Local>,
    now: DateTime<Local>,
    labels: &RelativeTimeLabels,
) -> String {
    let seconds = (now - then).num_seconds();
    match seconds {
        s if s < 1 => labels.just_now.clone(),
        s if s < 60 => format!("{s}{}", labels.seconds),
        s if s < 60 * 60 => format!("{}{}", s / 60, labels.minutes),
        s if s < 60 * 60 * 24 => format!("{}{}", s / (60 * 60), labels.hours),
        s => format!("{}{}", s / (60 * 60 * 24), labels.days),
    }
}

/// `2023/11/5 06:13:20`
pub fn absolute_time(time: DateTime<Local>) -> String {
    time.format("%Y/%-m/%-d %H:%M:%S").to_string()
}

/// `relative（absolute）`, as shown on the update line and under each listing.
pub fn timestamp(
    then: DateTime<Local>,
    now: DateTime<Local>,
    labels: &RelativeTimeLabels,
) -> String {
    format!(
        "{}（{}）",
        relative_time(then, now, labels),
        absolute_time(then)
    )
}

pub fn scope_label(scope: &MarketScope, labels: &Labels) -> String {
    match scope {
        MarketScope::World(name) | MarketScope::Region(name) => name.clone(),
        MarketScope::Datacenter(name) => format!("{name}{}", labels.datacenter_suffix),
        MarketScope::Unknown => labels.unknown_scope.clone(),
    }
}

#[cfg(test)]
mod test {
    use chrono::{Duration, Local, TimeZone};

    use super::*;

    #[test]
    fn readable_numbers() {
        assert_eq!(readable_number(0), "0");
        assert_eq!(readable_number(999), "999");
        assert_eq!(readable_number(1000), "1,000");
        assert_eq!(readable_number(123456), "123,456");
        assert_eq!(readable_number(1234567), "1,234,567");
    }

    #[test]
    fn relative_times() {
        let labels = RelativeTimeLabels::default();
        let now = Local.with_ymd_and_hms(2023, 11, 5, 12, 0, 0).unwrap();
        let ago = |d: Duration| relative_time(now - d, now, &labels);
        assert_eq!(ago(Duration::zero()), "刚刚");
        assert_eq!(ago(Duration::seconds(-30)), "刚刚");
        assert_eq!(ago(Duration::seconds(42)), "42秒前");
        assert_eq!(ago(Duration::seconds(61)), "1分钟前");
        assert_eq!(ago(Duration::hours(5)), "5小时前");
        assert_eq!(ago(Duration::days(3)), "3天前");
    }

    #[test]
    fn absolute_and_combined_times() {
        let labels = RelativeTimeLabels::default();
        let then = Local.with_ymd_and_hms(2023, 1, 5, 6, 13, 20).unwrap();
        assert_eq!(absolute_time(then), "2023/1/5 06:13:20");
        assert_eq!(
            timestamp(then, then + Duration::minutes(3), &labels),
            "3分钟前（2023/1/5 06:13:20）"
        );
    }

    #[test]
    fn scope_labels() {
        let labels = Labels::default();
        assert_eq!(
            scope_label(&MarketScope::Datacenter("猫小胖".into()), &labels),
            "猫小胖区"
        );
        assert_eq!(
            scope_label(&MarketScope::World("紫水栈桥".into()), &labels),
            "紫水栈桥"
        );
        assert_eq!(scope_label(&MarketScope::Unknown, &labels), "未知");
    }
}
