use foundation::Rgba;

/// Nine-class ColorBrewer sequential schemes (Cynthia Brewer, colorbrewer2.org).
const BREWER: &[(&str, [u32; 9])] = &[
    (
        "OrRd",
        [
            0xfff7ec, 0xfee8c8, 0xfdd49e, 0xfdbb84, 0xfc8d59, 0xef6548, 0xd7301f, 0xb30000,
            0x7f0000,
        ],
    ),
    (
        "YlOrRd",
        [
            0xffffcc, 0xffeda0, 0xfed976, 0xfeb24c, 0xfd8d3c, 0xfc4e2a, 0xe31a1c, 0xbd0026,
            0x800026,
        ],
    ),
    (
        "YlGnBu",
        [
            0xffffd9, 0xedf8b1, 0xc7e9b4, 0x7fcdbb, 0x41b6c4, 0x1d91c0, 0x225ea8, 0x253494,
            0x081d58,
        ],
    ),
    (
        "Blues",
        [
            0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c,
            0x08306b,
        ],
    ),
    (
        "Greens",
        [
            0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c,
            0x00441b,
        ],
    ),
    (
        "Reds",
        [
            0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15,
            0x67000d,
        ],
    ),
    (
        "Purples",
        [
            0xfcfbfd, 0xefedf5, 0xdadaeb, 0xbcbddc, 0x9e9ac8, 0x807dba, 0x6a51a3, 0x54278f,
            0x3f007d,
        ],
    ),
    (
        "Greys",
        [
            0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525,
            0x000000,
        ],
    ),
];

/// Color stops of a named scheme, light to dark. Lookup ignores ASCII case.
pub fn brewer(name: &str) -> Option<Vec<Rgba>> {
    let (_, hexes) = BREWER.iter().find(|(n, _)| n.eq_ignore_ascii_case(name))?;
    Some(hexes.iter().map(|&h| from_u32(h)).collect())
}

pub fn brewer_names() -> impl Iterator<Item = &'static str> {
    BREWER.iter().map(|(n, _)| *n)
}

fn from_u32(hex: u32) -> Rgba {
    Rgba::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

#[cfg(test)]
mod tests {
    use super::{brewer, brewer_names};
    use foundation::Rgba;

    #[test]
    fn looks_up_schemes_case_insensitively() {
        let orrd = brewer("orrd").expect("OrRd");
        assert_eq!(orrd.len(), 9);
        assert_eq!(orrd[0], Rgba::rgb(0xff, 0xf7, 0xec));
        assert_eq!(orrd[8], Rgba::rgb(0x7f, 0x00, 0x00));
        assert!(brewer("Rainbow").is_none());
        assert!(brewer_names().any(|n| n == "Blues"));
    }
}
