// 駆動する側アダプター（REST API）

pub mod rest_api;
pub mod request_dto;
pub mod response_dto;
