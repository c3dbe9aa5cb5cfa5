/// Musical key: one of the 12 major and 12 minor keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MusicalKey {
    // Major keys
    CMajor,
    DbMajor,
    DMajor,
    EbMajor,
    EMajor,
    FMajor,
    GbMajor,
    GMajor,
    AbMajor,
    AMajor,
    BbMajor,
    BMajor,

    // Minor keys
    CMinor,
    CsMinor,
    DMinor,
    EbMinor,
    EMinor,
    FMinor,
    FsMinor,
    GMinor,
    AbMinor,
    AMinor,
    BbMinor,
    BMinor,
}

const MAJOR_BY_PITCH_CLASS: [MusicalKey; 12] = [
    MusicalKey::CMajor,
    MusicalKey::DbMajor,
    MusicalKey::DMajor,
    MusicalKey::EbMajor,
    MusicalKey::EMajor,
    MusicalKey::FMajor,
    MusicalKey::GbMajor,
    MusicalKey::GMajor,
    MusicalKey::AbMajor,
    MusicalKey::AMajor,
    MusicalKey::BbMajor,
    MusicalKey::BMajor,
];

const MINOR_BY_PITCH_CLASS: [MusicalKey; 12] = [
    MusicalKey::CMinor,
    MusicalKey::CsMinor,
    MusicalKey::DMinor,
    MusicalKey::EbMinor,
    MusicalKey::EMinor,
    MusicalKey::FMinor,
    MusicalKey::FsMinor,
    MusicalKey::GMinor,
    MusicalKey::AbMinor,
    MusicalKey::AMinor,
    MusicalKey::BbMinor,
    MusicalKey::BMinor,
];

impl MusicalKey {
    /// Look up a key by pitch class (0 = C, 1 = C#/Db, ..., 11 = B)
    pub fn from_pitch_class(pitch_class: usize, minor: bool) -> Option<Self> {
        let table = if minor {
            &MINOR_BY_PITCH_CLASS
        } else {
            &MAJOR_BY_PITCH_CLASS
        };
        table.get(pitch_class).copied()
    }

    /// Short label used in the CSV report (e.g. `Am`, `C#m`, `Bb`)
    pub fn label(&self) -> &'static str {
        match self {
            MusicalKey::CMajor => "C",
            MusicalKey::DbMajor => "Db",
            MusicalKey::DMajor => "D",
            MusicalKey::EbMajor => "Eb",
            MusicalKey::EMajor => "E",
            MusicalKey::FMajor => "F",
            MusicalKey::GbMajor => "Gb",
            MusicalKey::GMajor => "G",
            MusicalKey::AbMajor => "Ab",
            MusicalKey::AMajor => "A",
            MusicalKey::BbMajor => "Bb",
            MusicalKey::BMajor => "B",

            MusicalKey::CMinor => "Cm",
            MusicalKey::CsMinor => "C#m",
            MusicalKey::DMinor => "Dm",
            MusicalKey::EbMinor => "Ebm",
            MusicalKey::EMinor => "Em",
            MusicalKey::FMinor => "Fm",
            MusicalKey::FsMinor => "F#m",
            MusicalKey::GMinor => "Gm",
            MusicalKey::AbMinor => "G#m",
            MusicalKey::AMinor => "Am",
            MusicalKey::BbMinor => "Bbm",
            MusicalKey::BMinor => "Bm",
        }
    }

    /// Get human-readable key name
    pub fn name(&self) -> &'static str {
        match self {
            MusicalKey::CMajor => "C Major",
            MusicalKey::DbMajor => "Db Major",
            MusicalKey::DMajor => "D Major",
            MusicalKey::EbMajor => "Eb Major",
            MusicalKey::EMajor => "E Major",
            MusicalKey::FMajor => "F Major",
            MusicalKey::GbMajor => "Gb Major",
            MusicalKey::GMajor => "G Major",
            MusicalKey::AbMajor => "Ab Major",
            MusicalKey::AMajor => "A Major",
            MusicalKey::BbMajor => "Bb Major",
            MusicalKey::BMajor => "B Major",

            MusicalKey::CMinor => "C Minor",
            MusicalKey::CsMinor => "C# Minor",
            MusicalKey::DMinor => "D Minor",
            MusicalKey::EbMinor => "Eb Minor",
            MusicalKey::EMinor => "E Minor",
            MusicalKey::FMinor => "F Minor",
            MusicalKey::FsMinor => "F# Minor",
            MusicalKey::GMinor => "G Minor",
            MusicalKey::AbMinor => "Ab Minor",
            MusicalKey::AMinor => "A Minor",
            MusicalKey::BbMinor => "Bb Minor",
            MusicalKey::BMinor => "B Minor",
        }
    }
}
