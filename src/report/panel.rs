//! Print order of the multiplex respiratory panels.

use once_cell::sync::Lazy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelKind {
    Rp23,
    Rp27,
    Rp36,
}

struct PanelEntry {
    name: &'static str,
    rp23: Option<u8>,
    rp27: Option<u8>,
    rp36: Option<u8>,
}

const fn entry(name: &'static str, rp23: Option<u8>, rp27: Option<u8>, rp36: Option<u8>) -> PanelEntry {
    PanelEntry {
        name,
        rp23,
        rp27,
        rp36,
    }
}

const PANEL_TABLE: &[PanelEntry] = &[
    entry("2019-nCoV", Some(1), None, None),
    entry("SARS-CoV-2", None, Some(1), None),
    entry("Adenovirus (AdV)", Some(2), None, Some(9)),
    entry("Bocavirus (HBoV)", Some(3), None, Some(10)),
    entry("Coronavirus 229E", Some(4), None, Some(5)),
    entry("Coronavirus HKU1", Some(5), None, Some(6)),
    entry("Coronavirus NL63", Some(6), None, Some(7)),
    entry("Coronavirus OC43", Some(7), None, Some(8)),
    entry("Human Metapneumovirus A+B", Some(8), None, None),
    entry("Human Metapneumovirus", None, Some(10), Some(16)),
    entry("Influenza A virus (FluA)", Some(9), Some(2), Some(1)),
    entry("Influenza B virus (FluB)", Some(13), Some(3), Some(2)),
    entry("Influenza A virus subtype H1 (FluA-H1)", Some(10), Some(6), None),
    entry("Influenza A virus subtype H1N1 (FluA-H1pdm09)", Some(11), Some(8), None),
    entry("Influenza A virus subtype H3 (FluA-H3)", Some(12), Some(7), None),
    entry("Parainfluenza virus 1 (HPIV-1)", Some(14), None, Some(12)),
    entry("Parainfluenza virus 2 (HPIV-2)", Some(15), None, Some(13)),
    entry("Parainfluenza virus 3 (HPIV-3)", Some(16), None, Some(14)),
    entry("Parainfluenza virus 4 (HPIV-4)", Some(17), None, Some(15)),
    entry("Human Rhinovirus (HRV) / Enterovirus (HEV)", Some(19), None, Some(11)),
    entry("Respiratory syncytial virus A+B", Some(18), None, None),
    entry("Bordetella pertussis (BP)", Some(20), Some(21), Some(23)),
    entry("Chlamydophila pneumoniae", Some(21), Some(22), Some(19)),
    entry("Legionella pneumophila (LP)", Some(22), Some(23), Some(22)),
    entry("Mycoplasma pneumoniae (MP)", Some(23), Some(24), Some(18)),
    entry("Streptococcus pneumoniae", None, Some(26), Some(20)),
    entry("Staphylococcus epidermidis", None, None, Some(24)),
    entry("Haemophilus influenzae", None, Some(27), Some(31)),
    entry("Escherichia coli", None, None, Some(17)),
    entry("Staphylococcus aureus", None, None, Some(26)),
    entry("Candida albicans", None, None, Some(27)),
    entry("Pseudomonas aeruginosa", None, None, Some(35)),
    entry("Aspergillus fumigatus", None, None, Some(29)),
    entry("Human Respiratory Syncytial Virus A (RSV A)", None, Some(4), Some(3)),
    entry("Human Respiratory Syncytial Virus B (RSV B)", None, Some(5), Some(4)),
    entry("Human Adenovirus", None, Some(9), None),
    entry("Human Enterovirus", None, Some(11), None),
    entry("Human Parainfluenza virus 1", None, Some(12), None),
    entry("Human Parainfluenza virus 2", None, Some(13), None),
    entry("Human Parainfluenza virus 3", None, Some(14), None),
    entry("Human Parainfluenza virus 4", None, Some(15), None),
    entry("Human Bocavirus 1/2/3/4", None, Some(16), None),
    entry("Human Rhinovirus A/B/C", None, Some(17), None),
    entry("Human Coronavirus 229E", None, Some(18), None),
    entry("Human Coronavirus NL63", None, Some(19), None),
    entry("Human Coronavirus OC43", None, Some(20), None),
    entry("Bordetella parapertussis", None, Some(25), None),
    entry("Klebsiella pneumoniae", None, None, Some(21)),
    entry("Salmonella", None, None, Some(25)),
    entry("Pneumocystis jirovecii", None, None, Some(28)),
    entry("Rickettsia", None, None, Some(30)),
    entry("Cryptococcus", None, None, Some(34)),
    entry("Acinetobacter baumannii", None, None, Some(33)),
    entry("Moraxella catarrhalis", None, None, Some(32)),
    entry("Streptococcus pyogenes", None, None, Some(36)),
];

fn ordered(kind: PanelKind) -> Vec<&'static str> {
    let mut rows: Vec<(u8, &'static str)> = PANEL_TABLE
        .iter()
        .filter_map(|e| kind.position(e).map(|p| (p, e.name)))
        .collect();
    rows.sort_by_key(|(p, _)| *p);
    rows.into_iter().map(|(_, name)| name).collect()
}

static RP23: Lazy<Vec<&'static str>> = Lazy::new(|| ordered(PanelKind::Rp23));
static RP27: Lazy<Vec<&'static str>> = Lazy::new(|| ordered(PanelKind::Rp27));
static RP36: Lazy<Vec<&'static str>> = Lazy::new(|| ordered(PanelKind::Rp36));

impl PanelKind {
    /// Panel named by a test type prefix such as `"Respiratory Pathogen 23"`.
    pub fn from_prefix(prefix_name: &str) -> Option<Self> {
        match prefix_name.trim() {
            "Respiratory Pathogen 23" => Some(PanelKind::Rp23),
            "Respiratory Pathogen 27" => Some(PanelKind::Rp27),
            "Respiratory Pathogen 36" => Some(PanelKind::Rp36),
            _ => None,
        }
    }

    fn position(self, entry: &PanelEntry) -> Option<u8> {
        match self {
            PanelKind::Rp23 => entry.rp23,
            PanelKind::Rp27 => entry.rp27,
            PanelKind::Rp36 => entry.rp36,
        }
    }

    /// Analytes on this panel in print order.
    pub fn order(self) -> &'static [&'static str] {
        match self {
            PanelKind::Rp23 => &RP23,
            PanelKind::Rp27 => &RP27,
            PanelKind::Rp36 => &RP36,
        }
    }
}
