pub mod calendar;
pub mod job_service;
pub mod notification_service;
pub mod reminder_service;
