//! Fixed calibration inputs shared by the table tools.
//!
//! Systematic tables come from the laserball scan analysis and are indexed by
//! laser wavelength in ascending order.

pub const LASER_WAVELENGTHS: [f64; 5] = [337.0, 369.0, 385.0, 420.0, 505.0];
pub const LASER_COUNT: usize = LASER_WAVELENGTHS.len();

/// Systematic error on the inner-vessel attenuation coefficient (1/mm).
pub const ATTENUATION_SYSTEMATICS: [f64; LASER_COUNT] =
    [1.98632e-6, 2.06508e-6, 2.09412e-6, 2.06529e-6, 2.14077e-6];

pub const DEFAULT_SCATTERING_FACTOR: f64 = 0.77;
pub const DEFAULT_FIT_DEGREE: usize = 1;
pub const DEFAULT_OPTICS_SECTION: &str = "index: \"lightwater_sno\"";
pub const FIT_FILE_EXTENSION: &str = "ocadb";

pub const ABSORPTION_GRID: (f64, f64, f64) = (200.0, 800.0, 20.0);
pub const PMT_GRID: (f64, f64, f64) = (220.0, 710.0, 10.0);

pub const ANGLE_BINS: usize = 90;
pub const GREY_DISC_CORRECTED_BINS: usize = 44;

/// First angle bin covered by [`PMT_SYSTEMATICS`]; bins outside
/// `PMT_SYSTEMATIC_FIRST_BIN..PMT_SYSTEMATIC_FIRST_BIN + 45` carry no systematic.
pub const PMT_SYSTEMATIC_FIRST_BIN: usize = 1;
pub const PMT_SYSTEMATIC_BINS: usize = 45;

pub const PMT_SYSTEMATICS: [[f64; PMT_SYSTEMATIC_BINS]; LASER_COUNT] = [
    [
        0.00186736, 0.00146445, 0.00140754, 0.00193626, 0.00260369, 0.00189529,
        0.00208158, 0.00186305, 0.00233566, 0.00225869, 0.00242107, 0.00257348,
        0.00288728, 0.00270905, 0.00296523, 0.00375206, 0.00364505, 0.00453092,
        0.00477369, 0.00495751, 0.00556234, 0.00617982, 0.00592406, 0.00605194,
        0.00707734, 0.00667703, 0.00861832, 0.00968784, 0.0106162, 0.0110885,
        0.0107862, 0.0121136, 0.0124131, 0.0121455, 0.0113913, 0.010609,
        0.0107754, 0.00989418, 0.0100891, 0.0100061, 0.0103288, 0.0113295,
        0.0125452, 0.0113065, 0.01327,
    ],
    [
        0.00201989, 0.00157936, 0.0017244, 0.00240077, 0.00244128, 0.00178572,
        0.00177036, 0.00221765, 0.0022411, 0.00255748, 0.00252637, 0.00253391,
        0.00295173, 0.00280282, 0.00339731, 0.00393779, 0.00422463, 0.00451123,
        0.00514919, 0.00536114, 0.00610879, 0.00644439, 0.00640922, 0.00676816,
        0.0076659, 0.00770208, 0.0102446, 0.0110332, 0.0126561, 0.0127521,
        0.0133823, 0.0142563, 0.013764, 0.0133318, 0.0132101, 0.0122389,
        0.01222, 0.0112426, 0.011758, 0.0111025, 0.0120834, 0.0125133,
        0.0131305, 0.0136234, 0.019581,
    ],
    [
        0.00182299, 0.00148455, 0.00146831, 0.00219701, 0.00245323, 0.00184803,
        0.0020752, 0.00235997, 0.00265037, 0.0026524, 0.00272654, 0.00271558,
        0.00283836, 0.00336517, 0.0036058, 0.00419395, 0.00448454, 0.0050988,
        0.0058805, 0.00628492, 0.0066474, 0.00669554, 0.00712517, 0.00800136,
        0.00867493, 0.009283, 0.0111758, 0.0124967, 0.0131189, 0.0135406,
        0.0148019, 0.0150311, 0.0140909, 0.0145648, 0.0140644, 0.0132635,
        0.0126604, 0.01243, 0.0120441, 0.0123326, 0.013304, 0.0136008,
        0.0150223, 0.0140958, 0.0223931,
    ],
    [
        0.00191705, 0.00159452, 0.00156537, 0.00208137, 0.00291205, 0.00200085,
        0.00240798, 0.00230646, 0.00263587, 0.00265711, 0.00272914, 0.00301872,
        0.00299786, 0.00316721, 0.00346219, 0.00431851, 0.00473325, 0.00519863,
        0.00596952, 0.00664745, 0.00662908, 0.00692448, 0.00759762, 0.00717464,
        0.00859507, 0.00919015, 0.0114774, 0.0124006, 0.0135112, 0.0135639,
        0.0141518, 0.0150547, 0.0147458, 0.0143315, 0.0141797, 0.0125487,
        0.0130769, 0.0126804, 0.0121346, 0.012116, 0.0127739, 0.0139925,
        0.0152885, 0.0137126, 0.015778,
    ],
    [
        0.00181183, 0.00171821, 0.00143635, 0.001903, 0.00296506, 0.00229676,
        0.0019582, 0.00271583, 0.00239423, 0.00252441, 0.00282262, 0.00297015,
        0.00329899, 0.00329227, 0.00362621, 0.00429313, 0.00461594, 0.00514328,
        0.00621183, 0.00634008, 0.00717348, 0.00766945, 0.00763018, 0.00815892,
        0.0087563, 0.00909037, 0.0122251, 0.0132481, 0.0142081, 0.0145435,
        0.0149663, 0.0161169, 0.0154213, 0.0152988, 0.0149672, 0.0130725,
        0.0129286, 0.0124406, 0.0123659, 0.0124154, 0.0133546, 0.0142646,
        0.0141935, 0.0151257, 0.0155923,
    ],
];

/// Systematic error of the PMT angular response for one laser row and angle bin.
pub fn pmt_systematic(laser_index: usize, angle_bin: usize) -> f64 {
    let Some(row) = PMT_SYSTEMATICS.get(laser_index) else {
        return 0.0;
    };
    angle_bin
        .checked_sub(PMT_SYSTEMATIC_FIRST_BIN)
        .and_then(|offset| row.get(offset))
        .copied()
        .unwrap_or(0.0)
}

/// Full-width (90 bin) systematic rows, zero outside the covered bins.
pub fn pmt_systematic_rows() -> Vec<Vec<f64>> {
    (0..LASER_COUNT)
        .map(|laser_index| {
            (0..ANGLE_BINS)
                .map(|angle_bin| pmt_systematic(laser_index, angle_bin))
                .collect()
        })
        .collect()
}
