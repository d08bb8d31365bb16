//! Static lookup of (raw-estimate -> bias correction) per precision, plus
//! the `alphaMM` and small/mid-range threshold constants.

/// `(raw[b], bias[b])`: sorted ascending, equal length, one pair per
/// supported precision.
fn tables(b: u32) -> (&'static [f64], &'static [f64]) {
    match b {
        4 => (&[1.6, 3.2, 5.6, 8.8, 12.8, 17.6, 25.6, 35.2], &[1.284, 1.0305, 0.7408, 0.4771, 0.2753, 0.1423, 0.0474, 0.0127]),
        5 => (&[3.2, 6.4, 11.2, 17.6, 25.6, 35.2, 51.2, 70.4], &[2.5681, 2.0609, 1.4816, 0.9542, 0.5505, 0.2845, 0.0947, 0.0253]),
        6 => (&[6.4, 12.8, 22.4, 35.2, 51.2, 70.4, 102.4, 140.8], &[5.1361, 4.1218, 2.9633, 1.9085, 1.1011, 0.5691, 0.1894, 0.0506]),
        7 => (&[12.8, 25.6, 44.8, 70.4, 102.4, 140.8, 204.8, 281.6], &[10.2722, 8.2437, 5.9266, 3.8169, 2.2022, 1.1382, 0.3789, 0.1012]),
        8 => (&[25.6, 51.2, 89.6, 140.8, 204.8, 281.6, 409.6, 563.2], &[20.5445, 16.4873, 11.8531, 7.6339, 4.4043, 2.2764, 0.7577, 0.2024]),
        9 => (&[51.2, 102.4, 179.2, 281.6, 409.6, 563.2, 819.2, 1126.4], &[41.089, 32.9747, 23.7063, 15.2677, 8.8087, 4.5528, 1.5155, 0.4048]),
        10 => (&[102.4, 204.8, 358.4, 563.2, 819.2, 1126.4, 1638.4, 2252.8], &[82.1779, 65.9493, 47.4125, 30.5354, 17.6174, 9.1056, 3.031, 0.8097]),
        11 => (&[204.8, 409.6, 716.8, 1126.4, 1638.4, 2252.8, 3276.8, 4505.6], &[164.3558, 131.8987, 94.8251, 61.0708, 35.2348, 18.2111, 6.062, 1.6194]),
        12 => (&[409.6, 819.2, 1433.6, 2252.8, 3276.8, 4505.6, 6553.6, 9011.2], &[328.7117, 263.7973, 189.6502, 122.1416, 70.4696, 36.4223, 12.1239, 3.2387]),
        13 => (&[819.2, 1638.4, 2867.2, 4505.6, 6553.6, 9011.2, 13107.2, 18022.4], &[657.4234, 527.5946, 379.3003, 244.2832, 140.9392, 72.8446, 24.2479, 6.4775]),
        14 => (&[1638.4, 3276.8, 5734.4, 9011.2, 13107.2, 18022.4, 26214.4, 36044.8], &[1314.8468, 1055.1893, 758.6006, 488.5664, 281.8783, 145.6892, 48.4957, 12.9549]),
        15 => (&[3276.8, 6553.6, 11468.8, 18022.4, 26214.4, 36044.8, 52428.8, 72089.6], &[2629.6936, 2110.3785, 1517.2012, 977.1328, 563.7566, 291.3784, 96.9914, 25.9098]),
        16 => (&[6553.6, 13107.2, 22937.6, 36044.8, 52428.8, 72089.6, 104857.6, 144179.2], &[5259.3872, 4220.7571, 3034.4024, 1954.2657, 1127.5132, 582.7567, 193.9829, 51.8197]),
        17 => (&[13107.2, 26214.4, 45875.2, 72089.6, 104857.6, 144179.2, 209715.2, 288358.4], &[10518.7744, 8441.5142, 6068.8049, 3908.5314, 2255.0264, 1165.5134, 387.9657, 103.6393]),
        18 => (&[26214.4, 52428.8, 91750.4, 144179.2, 209715.2, 288358.4, 419430.4, 576716.8], &[21037.5488, 16883.0284, 12137.6098, 7817.0628, 4510.0529, 2331.0268, 775.9314, 207.2787]),
        _ => unreachable!("precision validated at construction to be in [4, 18]"),
    }
}

/// Interpolates the bias correction for raw estimate `e` at precision `b`.
pub fn bias_estimate(e: f64, b: u32) -> f64 {
    let (raw, bias) = tables(b);

    let idx = raw.partition_point(|&x| x < e);
    if idx == 0 {
        return bias[0];
    }
    if idx == raw.len() {
        return bias[raw.len() - 1];
    }

    let (x0, x1) = (raw[idx - 1], raw[idx]);
    let (y0, y1) = (bias[idx - 1], bias[idx]);
    y0 + (e - x0) * (y1 - y0) / (x1 - x0)
}

/// `alphaMM[b] = (0.7213 / (1 + 1.079/m)) * m^2`, the Flajolet-Fusy-Gandouet-
/// Meunier bias constant under the standard `m >= 128` approximation.
pub fn alpha_mm(b: u32) -> f64 {
    let m = (1u64 << b) as f64;
    (0.7213 / (1.0 + 1.079 / m)) * m * m
}

/// `threshold[b] = 5*m`, the boundary below which small/mid-range
/// bias correction applies.
pub fn threshold(b: u32) -> f64 {
    5.0 * (1u64 << b) as f64
}
