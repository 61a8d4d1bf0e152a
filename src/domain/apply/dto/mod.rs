pub mod apply_report_dto;
