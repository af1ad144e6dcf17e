use chrono::{NaiveDate, NaiveTime};
use saju_core::{generate_saju_report, BirthInfo, CalendarType, Gender};

fn main() {
    // Example usage: 18th june 1991 07:10 AM, Seoul
    let birth_info = BirthInfo {
        date: NaiveDate::from_ymd_opt(1991, 6, 18).expect("valid date"),
        time: NaiveTime::from_hms_opt(7, 10, 0).expect("valid time"),
        timezone: "Asia/Seoul".to_string(),
        calendar: CalendarType::Solar,
        gender: Gender::Male,
    };

    match generate_saju_report(&birth_info) {
        Ok(report) => println!("{:#?}", report),
        Err(e) => eprintln!("Error: {}", e),
    }
}
