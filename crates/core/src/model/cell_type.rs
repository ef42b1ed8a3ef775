//! The closed cell-type vocabulary.
//!
//! Annotations are Leiden cluster labels of the form `<cluster>_<name>`.
//! Every annotation in the metadata must map to one of these variants; the
//! summary tables carry one count column and one min-distance column per
//! variant, in [`CellType::ALL`] order.

use std::fmt;
use std::str::FromStr;

/// Cell-type annotation.
///
/// Variants are declared in summary-table column order; the discriminant is
/// the column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellType {
    Tumor5 = 0,
    Tumor4 = 1,
    Fibroblasts1 = 2,
    CD8TCells3 = 3,
    ImmuneProliferating14 = 4,
    Macrophages2 = 5,
    Monocytes9 = 6,
    TReg13 = 7,
    EndotheliumVascular8 = 8,
    TumorProliferating22 = 9,
    Tumor20 = 10,
    Pericytes11 = 11,
    Macrophages7 = 12,
    EndotheliumLymphatic17 = 13,
    Basal15 = 14,
    Fibroblasts0 = 15,
    PlasmaCells10 = 16,
    BCells22 = 17,
    SmoothMuscle12 = 18,
    Unnamed23 = 19,
    MastBasophils19 = 20,
    DendriticMyeloid16 = 21,
    AlveolarEpithelial18 = 22,
    AirwayEpithelium6 = 23,
}

impl CellType {
    /// Number of cell types in the vocabulary.
    pub const COUNT: usize = 24;

    /// Column order of the summary tables.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Tumor5,
        Self::Tumor4,
        Self::Fibroblasts1,
        Self::CD8TCells3,
        Self::ImmuneProliferating14,
        Self::Macrophages2,
        Self::Monocytes9,
        Self::TReg13,
        Self::EndotheliumVascular8,
        Self::TumorProliferating22,
        Self::Tumor20,
        Self::Pericytes11,
        Self::Macrophages7,
        Self::EndotheliumLymphatic17,
        Self::Basal15,
        Self::Fibroblasts0,
        Self::PlasmaCells10,
        Self::BCells22,
        Self::SmoothMuscle12,
        Self::Unnamed23,
        Self::MastBasophils19,
        Self::DendriticMyeloid16,
        Self::AlveolarEpithelial18,
        Self::AirwayEpithelium6,
    ];

    /// Annotation label exactly as it appears in the metadata.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fibroblasts0 => "0_Fibroblasts",
            Self::Fibroblasts1 => "1_Fibroblasts",
            Self::Macrophages2 => "2_Macrophages",
            Self::CD8TCells3 => "3_CD8 T cells",
            Self::Tumor4 => "4_Tumor",
            Self::Tumor5 => "5_Tumor",
            Self::AirwayEpithelium6 => "6_Airway epithelium",
            Self::Macrophages7 => "7_Macrophages",
            Self::EndotheliumVascular8 => "8_Endothelium vascular",
            Self::Monocytes9 => "9_Monocytes",
            Self::PlasmaCells10 => "10_Plasma cells",
            Self::Pericytes11 => "11_Pericytes",
            Self::SmoothMuscle12 => "12_Smooth muscle",
            Self::TReg13 => "13_T reg",
            Self::ImmuneProliferating14 => "14_Immune proliferating",
            Self::Basal15 => "15_Basal",
            Self::DendriticMyeloid16 => "16_Dendritic myeloid",
            Self::EndotheliumLymphatic17 => "17_Endothelium lymphatic",
            Self::AlveolarEpithelial18 => "18_Alveolar epithelial",
            Self::MastBasophils19 => "19_Mast/Basophils",
            Self::Tumor20 => "20_Tumor",
            Self::TumorProliferating22 => "22_Tumor proliferating",
            Self::BCells22 => "22_B Cells",
            Self::Unnamed23 => "23_",
        }
    }

    /// Position of this type in [`CellType::ALL`].
    #[inline]
    pub const fn column(self) -> usize {
        self as usize
    }

    /// Parse an annotation label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.label() == label)
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CellType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| s.to_string())
    }
}
