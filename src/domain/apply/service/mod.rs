pub mod apply_resource_service;
pub mod dispatch_service;
pub mod manifest_service;
