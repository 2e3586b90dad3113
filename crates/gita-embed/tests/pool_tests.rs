use candle_core::{Device, Tensor, DType};
use gita_embed::masked_mean_l2;

#[test]
fn masked_mean_l2_basic() {
    let dev = Device::Cpu;
    // Two tokens with hidden dim 4; second token is masked out.
    let h = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0,  // token 0
                                 5.0, 6.0, 7.0, 8.0],    // token 1
                               (1, 2, 4), &dev).unwrap();
    let mask = Tensor::from_slice(&[1u32, 0u32], (1, 2), &dev).unwrap()
        .to_dtype(DType::F32).unwrap();
    let out = masked_mean_l2(&h, &mask).unwrap();
    let v: Vec<Vec<f32>> = out.to_vec2().unwrap();
    let v = &v[0];
    // Mean over unmasked tokens = first token [1,2,3,4], then L2 normalize
    let norm: f32 = (1.0f32*1.0 + 2.0*2.0 + 3.0*3.0 + 4.0*4.0).sqrt();
    let expected = [1.0/norm, 2.0/norm, 3.0/norm, 4.0/norm];
    for (a,b) in v.iter().cloned().zip(expected) {
        assert!((a - b).abs() < 1e-5, "a={} b={}", a, b);
    }
}

#[test]
fn masked_mean_l2_accepts_integer_mask_batch() {
    let dev = Device::Cpu;
    let h = Tensor::from_slice(&[3.0f32, 4.0, 9.0, 9.0,
                                 0.0, 2.0, 0.0, 4.0], (2, 2, 2), &dev).unwrap();
    let mask = Tensor::from_slice(&[1u32, 0, 1, 1], (2, 2), &dev).unwrap();
    let out: Vec<Vec<f32>> = masked_mean_l2(&h, &mask).unwrap().to_vec2().unwrap();
    assert!((out[0][0] - 0.6).abs() < 1e-5 && (out[0][1] - 0.8).abs() < 1e-5);
    // mean of [0,2] and [0,4] is [0,3] -> [0,1]
    assert!(out[1][0].abs() < 1e-5 && (out[1][1] - 1.0).abs() < 1e-5);
}

#[test]
fn masked_mean_l2_matches_hand_computed_mean() {
    let dev = Device::Cpu;
    // Three tokens, the padded third one is huge and must not leak into the mean.
    let h = Tensor::from_slice(&[1.0f32, 0.0, 2.0,
                                 3.0, 4.0, 0.0,
                                 100.0, 100.0, 100.0], (1, 3, 3), &dev).unwrap();
    let mask = Tensor::from_slice(&[1u32, 1, 0], (1, 3), &dev).unwrap();
    let out: Vec<Vec<f32>> = masked_mean_l2(&h, &mask).unwrap().to_vec2().unwrap();
    // mean = [2, 2, 1], |mean| = 3
    let expected = [2.0f32 / 3.0, 2.0 / 3.0, 1.0 / 3.0];
    for (a, b) in out[0].iter().zip(expected) {
        assert!((a - b).abs() < 1e-5, "a={a} b={b}");
    }
}
