use std::sync::Arc;

use serial_test::serial;
use stencil_layout::{
    Alignment, LayoutError, LayoutVector, NoHalo, ViewResolver,
    config::{
        GlobalConfig, LogCrateLevel, Logger, allocation::AllocationLogLevel,
        resolution::ResolutionLogLevel,
    },
};

fn file_logging_config(path: &std::path::Path) -> GlobalConfig {
    let mut config = GlobalConfig::default();
    config.resolution.logger.level = ResolutionLogLevel::Full;
    config.resolution.logger.file = Some(path.to_path_buf());
    config.resolution.logger.append = false;
    config.allocation.logger.level = AllocationLogLevel::Full;
    config.allocation.logger.file = Some(path.to_path_buf());
    config.allocation.logger.log = Some(LogCrateLevel::Debug);
    config
}

#[test_log::test]
#[serial]
fn resolver_writes_both_channels_to_one_file() {
    let path = std::env::temp_dir().join("stencil-layout-resolver-test.log");
    let logger = Logger::from_config(Arc::new(file_logging_config(&path)));
    // The shared file plus the `log` crate output of the allocation channel.
    assert_eq!(logger.output_count(), 2);

    let mut resolver = ViewResolver::with_logger(logger);
    let info = resolver
        .storage_info([10, 4, 2], &[2, 0, 1], [3, 1, 1], Alignment::new(8))
        .unwrap();
    let storage = resolver.allocate::<f32>(info, 2);

    let view = resolver.resolve(&storage, 1).unwrap();
    assert_eq!(view.origin_offset, 5);
    assert_eq!(
        resolver.resolve(&storage, 4),
        Err(LayoutError::FieldOutOfRange { index: 4, count: 2 })
    );
    drop(resolver);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("[Allocation] dims [10, 4, 2]"));
    assert!(content.contains("[Resolution] field 1: origin 5 (+20 bytes)"));
    assert!(content.contains("dim 0 (Unit): halo 3, left padding 5, stride 1"));
    assert!(content.contains("first interior element at"));
    assert!(content.contains("Field 4 is out of range"));

    let _ = std::fs::remove_file(path);
}

#[test_log::test]
#[serial]
fn global_config_is_set_once_and_shared() {
    let mut config = GlobalConfig::default();
    config.resolution.logger.level = ResolutionLogLevel::Basic;
    config.resolution.logger.log = Some(LogCrateLevel::Info);
    GlobalConfig::set(config);

    let current = GlobalConfig::get();
    assert_eq!(current.resolution.logger.level, ResolutionLogLevel::Basic);

    let path = std::env::temp_dir().join("stencil-layout-saved-config.toml");
    GlobalConfig::save_default(&path).unwrap();
    let saved = GlobalConfig::from_file_path(&path).unwrap();
    assert_eq!(saved.resolution.logger.level, ResolutionLogLevel::Basic);
    assert_eq!(saved.resolution.logger.log, Some(LogCrateLevel::Info));
    let _ = std::fs::remove_file(path);

    let mut resolver = ViewResolver::new();
    let layout = LayoutVector::row_major(2);
    let info = resolver
        .storage_info([4, 4], &layout, NoHalo, Alignment::NONE)
        .unwrap();
    let storage = resolver.allocate::<u8>(info, 1);
    assert!(resolver.resolve(&storage, 0).is_ok());
}
