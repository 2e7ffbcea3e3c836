use crate::config::{Backbone, DecoderConfig, LoaderOptions};
use crate::error::BigGanError;

#[test]
fn test_channel_schedules_scale_with_width() {
    let config = DecoderConfig::new(8, 3, 8, 32, 1, 1, 1, 0);
    assert_eq!(config.channel_schedule().unwrap(), vec![384, 192, 96, 48, 48]);

    let config = DecoderConfig::new(8, 1, 8, 16, 1, 1, 1, 0);
    assert_eq!(config.channel_schedule().unwrap(), vec![128, 64, 32, 16]);

    let config = DecoderConfig::new(8, 2, 8, 8, 1, 1, 1, 0);
    assert_eq!(config.channel_schedule().unwrap(), vec![128, 64, 32]);
}

#[test]
fn test_block_schedules_match_channel_schedules() {
    for ratio in [8, 16, 32] {
        let config = DecoderConfig::new(8, 1, 8, ratio, 1, 1, 1, 0);
        assert_eq!(
            config.block_schedule().unwrap().len(),
            config.channel_schedule().unwrap().len()
        );
    }
    let config = DecoderConfig::new(8, 1, 8, 32, 1, 1, 1, 0);
    assert_eq!(config.block_schedule().unwrap(), &[1, 1, 2, 2, 1]);
}

#[test]
fn test_output_size() {
    let config = DecoderConfig::new(512, 1, 512, 32, 3, 3, 3, 2);
    assert_eq!(config.output_size().unwrap(), [96, 96]);

    let config = DecoderConfig::new(512, 1, 512, 8, 2, 5, 3, 2);
    assert_eq!(config.output_size().unwrap(), [16, 40]);
}

#[test]
fn test_unsupported_ratio() {
    let config = DecoderConfig::new(8, 1, 8, 5, 1, 1, 1, 0);

    match config.validate() {
        Err(BigGanError::UnsupportedRatio { ratio }) => assert_eq!(ratio, 5),
        other => panic!("Expected UnsupportedRatio error, got {other:?}"),
    }
    assert!(config.channel_schedule().is_err());
    assert!(config.output_size().is_err());
}

#[test]
fn test_zero_sizes_are_invalid() {
    let config = DecoderConfig::new(8, 0, 8, 16, 1, 1, 1, 0);

    match config.validate() {
        Err(BigGanError::InvalidConfiguration { reason }) => {
            assert!(reason.contains("width must be greater than 0"));
        }
        other => panic!("Expected InvalidConfiguration error, got {other:?}"),
    }
}

#[test]
fn test_zero_mlp_depth_is_valid() {
    let config = DecoderConfig::new(8, 1, 8, 16, 1, 1, 1, 0);
    assert!(config.validate().is_ok());
}

#[test]
fn test_hierarchical_requires_16x16_before_last_group() {
    // ratio 16: 2 -> 4 -> 8 -> 16 before the last group
    let config = DecoderConfig::new(8, 1, 8, 16, 2, 2, 1, 0).with_hierarchical(true);
    assert!(config.validate().is_ok());

    let config = DecoderConfig::new(8, 1, 8, 16, 2, 3, 1, 0).with_hierarchical(true);
    match config.validate() {
        Err(BigGanError::InvalidConfiguration { reason }) => {
            assert!(reason.contains("16x24"));
        }
        other => panic!("Expected InvalidConfiguration error, got {other:?}"),
    }
}

#[test]
fn test_input_features() {
    let config = DecoderConfig::new(8, 1, 8, 32, 1, 1, 1, 0);
    assert_eq!(config.input_features(), 8);
    assert_eq!(config.with_hierarchical(true).input_features(), 16);
}

#[test]
fn test_loader_options_resnet18() {
    let options = LoaderOptions::new("resnet18".to_string())
        .with_dec_width(2)
        .with_dec_mlp_depth(3);

    assert_eq!(options.backbone().unwrap(), Backbone::Resnet18);

    let config = options.decoder_config().unwrap();
    assert_eq!(config.z_dim, 512);
    assert_eq!(config.in_ch, 512);
    assert_eq!(config.width, 2);
    assert_eq!(config.ratio, 32);
    assert_eq!([config.in_h, config.in_w], [3, 3]);
    assert_eq!(config.mlp_width, 3);
    assert_eq!(config.mlp_depth, 3);
    assert!(!config.hierarchical);
}

#[test]
fn test_loader_options_resnet50() {
    let config = LoaderOptions::new("resnet50".to_string())
        .with_dec_hierarchical(true)
        .decoder_config()
        .unwrap();

    assert_eq!(config.z_dim, 2048);
    assert_eq!(config.in_ch, 2048);
    assert_eq!(config.ratio, 224 / 7);
    assert_eq!([config.in_h, config.in_w], [7, 7]);
    assert_eq!(config.mlp_width, 7);
    assert!(config.hierarchical);
}

#[test]
fn test_loader_options_unknown_model() {
    let options = LoaderOptions::new("swin_v1_l".to_string());

    match options.decoder_config() {
        Err(BigGanError::NotImplemented { backbone }) => assert_eq!(backbone, "swin_v1_l"),
        other => panic!("Expected NotImplemented error, got {other:?}"),
    }
}
