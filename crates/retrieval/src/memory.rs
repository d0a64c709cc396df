//! Seeded in-memory keyword index.
//!
//! One index per domain, loaded at startup with curated documents. Scoring
//! is plain keyword relevance: term occurrences normalized by document
//! length. Good enough to ground answers in a demo deployment and to make
//! the research loop testable without network access.

use async_trait::async_trait;
use wardline_core::{Passage, RetrievalError, SearchBackend};

const MAX_RESULTS: usize = 5;
const SNIPPET_LEN: usize = 240;

#[derive(Debug, Clone)]
struct Document {
    title: String,
    body: String,
    source: String,
}

/// A keyword index over a fixed document set.
pub struct MemoryIndex {
    name: String,
    documents: Vec<Document>,
}

impl MemoryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Vec::new(),
        }
    }

    pub fn add(
        &mut self,
        title: impl Into<String>,
        body: impl Into<String>,
        source: impl Into<String>,
    ) {
        self.documents.push(Document {
            title: title.into(),
            body: body.into(),
            source: source.into(),
        });
    }

    /// The seeded nursing-protocol index.
    pub fn nursing() -> Self {
        let mut index = Self::new("nursing_protocols");
        index.add(
            "IV Insertion Protocol",
            "Peripheral IV insertion: verify the order, perform hand hygiene, apply a tourniquet \
             7-10 cm above the intended site, select a vein (forearm preferred over hand), cleanse \
             with chlorhexidine for 30 seconds and allow to dry, insert the catheter bevel-up at a \
             15-30 degree angle, confirm flashback, advance the catheter, release the tourniquet, \
             flush with saline, and secure with a transparent dressing. Document site, gauge, and \
             time. Replace peripheral IVs every 72-96 hours.",
            "protocols/iv-insertion",
        );
        index.add(
            "Wound Care and Dressing Changes",
            "Assess the wound for size, depth, exudate, and signs of infection at every dressing \
             change. Use aseptic technique: sterile gloves, sterile field, cleanse from the center \
             outward with normal saline. Select the dressing by wound type: hydrocolloid for light \
             exudate, foam for moderate, alginate for heavy. Document wound measurements and \
             appearance. Notify the physician of increasing erythema, purulent drainage, or fever.",
            "protocols/wound-care",
        );
        index.add(
            "Medication Administration: The Five Rights",
            "Before administering any medication confirm the five rights: right patient (two \
             identifiers), right drug, right dose, right route, right time. High-alert medications \
             (insulin, anticoagulants, opioids) require a second nurse verification. Never leave \
             medications unattended at the bedside. Document administration immediately, never in \
             advance.",
            "protocols/medication-administration",
        );
        index.add(
            "Vital Signs Monitoring",
            "Standard frequency: every 4 hours for stable patients, every 15 minutes during blood \
             transfusion for the first hour, continuous monitoring post-operatively for the first \
             2 hours. Escalate: systolic below 90, heart rate above 130 or below 40, respiratory \
             rate above 28, oxygen saturation below 92 percent, temperature above 38.5.",
            "protocols/vital-signs",
        );
        index.add(
            "Blood Glucose Monitoring",
            "Check capillary glucose before meals and at bedtime for diabetic patients. Treat \
             readings below 4.0 mmol/L per the hypoglycemia protocol: 15 g fast-acting \
             carbohydrate, recheck in 15 minutes. Notify the physician for readings above 20 \
             mmol/L or two consecutive readings above 15.",
            "protocols/glucose-monitoring",
        );
        index
    }

    /// The seeded HR-policy index.
    pub fn hr() -> Self {
        let mut index = Self::new("hr_policies");
        index.add(
            "Annual Leave and Public Holidays",
            "Full-time staff accrue 25 days of annual leave per year, pro-rated for part-time \
             contracts. The hospital observes 11 public holidays; staff rostered on a public \
             holiday receive a day in lieu plus the holiday premium. Leave requests go through \
             the staff portal and require manager approval at least 14 days in advance for \
             periods longer than 3 days. Unused leave carries over up to 5 days into the next \
             calendar year.",
            "policies/annual-leave",
        );
        index.add(
            "Sick Leave Policy",
            "Staff are entitled to 10 paid sick days per year. Absences of 3 or more consecutive \
             days require a medical certificate. Notify your shift coordinator at least 2 hours \
             before a rostered shift. Extended illness beyond 10 days moves to the income \
             protection scheme after HR review.",
            "policies/sick-leave",
        );
        index.add(
            "Parental Leave",
            "Primary caregivers are entitled to 26 weeks of parental leave, the first 18 weeks \
             paid at full salary. Secondary caregivers receive 4 weeks paid. Notify HR in writing \
             at least 10 weeks before the intended start date. Staff returning from parental \
             leave may request part-time hours for the first 12 months.",
            "policies/parental-leave",
        );
        index.add(
            "Benefits Overview",
            "All permanent staff receive private health cover, a pension contribution of 8 \
             percent, subsidized meals in the staff cafeteria, and free annual flu vaccination. \
             Night-shift staff receive a 15 percent shift differential. The employee assistance \
             program offers confidential counselling, available 24/7.",
            "policies/benefits",
        );
        index
    }

    /// The seeded pharmacy-inventory index.
    pub fn pharmacy() -> Self {
        let mut index = Self::new("pharmacy_inventory");
        index.add(
            "Ibuprofen Stock",
            "Ibuprofen 200 mg tablets: 480 units in stock, ward stock locations A3 and B1. \
             Ibuprofen 400 mg tablets: 220 units, pharmacy dispensary only. Reorder threshold \
             100 units. Next scheduled delivery Thursday.",
            "inventory/ibuprofen",
        );
        index.add(
            "Paracetamol / Acetaminophen Stock",
            "Paracetamol 500 mg tablets: 1200 units in stock across all ward stations. \
             IV paracetamol 1 g vials: 85 units, pharmacy refrigerated store. Maximum daily \
             dose 4 g; reduce to 3 g for patients under 50 kg or with hepatic impairment.",
            "inventory/paracetamol",
        );
        index.add(
            "Insulin Stock and Storage",
            "Insulin glargine: 42 pens, refrigerated store R2. Insulin aspart: 58 pens. Store \
             at 2-8 degrees; in-use pens may be kept at room temperature for up to 28 days. \
             High-alert medication: two-nurse verification required for all doses.",
            "inventory/insulin",
        );
        index.add(
            "Controlled Substances",
            "Oxycodone 5 mg: 140 tablets, controlled drugs cabinet, two-signature sign-out. \
             Morphine sulfate 10 mg/mL: 60 ampoules. All controlled substance counts are \
             reconciled at every shift change; discrepancies are reported to the pharmacy \
             manager immediately.",
            "inventory/controlled-substances",
        );
        index.add(
            "Antibiotic Formulary",
            "Amoxicillin 500 mg capsules: 300 units. Ceftriaxone 1 g vials: 120 units. \
             Vancomycin requires infectious diseases approval before dispensing. Penicillin \
             allergy: prescribe a macrolide or consult pharmacy for alternatives.",
            "inventory/antibiotics",
        );
        index
    }

    fn snippet(body: &str) -> String {
        if body.len() <= SNIPPET_LEN {
            return body.to_string();
        }
        let mut end = SNIPPET_LEN;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}

#[async_trait]
impl SearchBackend for MemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &str) -> Result<Vec<Passage>, RetrievalError> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .filter(|t| t.len() > 2)
            .map(String::from)
            .collect();

        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut results: Vec<Passage> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let haystack = format!("{} {}", doc.title, doc.body).to_lowercase();
                let occurrences: usize =
                    terms.iter().map(|t| haystack.matches(t.as_str()).count()).sum();
                if occurrences == 0 {
                    return None;
                }
                // Keyword relevance normalized by document length
                let score = occurrences as f32 / (doc.body.len() as f32 / 100.0).max(1.0);
                Some(Passage {
                    title: doc.title.clone(),
                    snippet: Self::snippet(&doc.body),
                    source: doc.source.clone(),
                    score,
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(MAX_RESULTS);

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn nursing_index_finds_iv_protocol() {
        let index = MemoryIndex::nursing();
        let results = index.search("IV insertion").await.unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].title, "IV Insertion Protocol");
    }

    #[tokio::test]
    async fn pharmacy_index_finds_ibuprofen() {
        let index = MemoryIndex::pharmacy();
        let results = index.search("ibuprofen stock").await.unwrap();
        assert!(!results.is_empty());
        assert!(results[0].title.contains("Ibuprofen"));
        assert!(results[0].snippet.contains("480 units"));
    }

    #[tokio::test]
    async fn hr_index_finds_leave_policy() {
        let index = MemoryIndex::hr();
        let results = index.search("vacation annual leave").await.unwrap();
        assert!(!results.is_empty());
        assert!(results[0].source.starts_with("policies/"));
    }

    #[tokio::test]
    async fn no_match_returns_empty() {
        let index = MemoryIndex::nursing();
        let results = index.search("quarterly tax filings").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn short_terms_are_ignored() {
        let index = MemoryIndex::nursing();
        // "iv" alone is below the term-length cutoff; it still matches via
        // the full phrase in other queries, so an all-short query is empty.
        let results = index.search("iv an to").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn results_are_ranked_and_bounded() {
        let mut index = MemoryIndex::new("test");
        for i in 0..10 {
            index.add(format!("Doc {i}"), "saline flush saline", "test/doc");
        }
        index.add("Best", "saline saline saline saline flush", "test/best");

        let results = index.search("saline flush").await.unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].title, "Best");
    }

    #[tokio::test]
    async fn snippet_is_truncated() {
        let mut index = MemoryIndex::new("test");
        index.add("Long", "word ".repeat(200), "test/long");
        let results = index.search("word").await.unwrap();
        assert!(results[0].snippet.len() < 250 + '…'.len_utf8());
        assert!(results[0].snippet.ends_with('…'));
    }
}
