//! Static disaster-preparedness knowledge base.
//!
//! The knowledge base is plain data: an ordered list of disaster
//! categories, optional per-category steps and FAQ entries, the canned
//! response templates and a pool of tips. It can be replaced wholesale by
//! loading a YAML or JSON file with the same shape.
//!
//! ```yaml
//! categories: [earthquake, flood]
//! categoryInfo:
//!   earthquake:
//!     steps: [Drop, Cover, Hold on]
//!     faq:
//!       - keyword: aftershock
//!         answer: Expect aftershocks for days.
//! templates:
//!   greeting: Hello!
//!   emergencyActivation: Emergency mode on.
//!   unknownFallback: Sorry?
//!   emergencyContacts: Call 911.
//! tips: [Stay calm.]
//! ```

use std::collections::HashMap;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ChatError, ChatResult};

/// A single FAQ entry; `keyword` is matched as a substring of normalized input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaqEntry {
    pub keyword: String,
    pub answer: String,
}

/// Steps and FAQ known for one category. Both parts are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    /// Ordered; the first matching keyword wins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faq: Vec<FaqEntry>,
}

impl CategoryInfo {
    /// Info with safety steps and no FAQ
    pub fn with_steps<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            steps: Some(steps.into_iter().map(Into::into).collect()),
            faq: Vec::new(),
        }
    }

    /// Append an FAQ entry
    pub fn faq(mut self, keyword: impl Into<String>, answer: impl Into<String>) -> Self {
        self.faq.push(FaqEntry {
            keyword: keyword.into(),
            answer: answer.into(),
        });
        self
    }
}

/// Named canned responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Templates {
    pub greeting: String,
    pub emergency_activation: String,
    pub unknown_fallback: String,
    pub emergency_contacts: String,
}

/// Immutable knowledge base consulted by the intent resolver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBase {
    /// Match priority order
    categories: Vec<String>,
    #[serde(default)]
    category_info: HashMap<String, CategoryInfo>,
    templates: Templates,
    tips: Vec<String>,
}

impl KnowledgeBase {
    /// Build and validate a knowledge base without category info
    pub fn new<I, S>(categories: I, templates: Templates, tips: Vec<String>) -> ChatResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            category_info: HashMap::new(),
            templates,
            tips,
        }
        .validated()
    }

    /// Attach info to a category. Names are normalized like the input text.
    pub fn with_category_info(mut self, category: impl AsRef<str>, mut info: CategoryInfo) -> Self {
        normalize_faq(&mut info);
        self.category_info.insert(normalize_key(category.as_ref()), info);
        self
    }

    /// Parse a YAML document and validate it
    pub fn from_yaml_str(content: &str) -> ChatResult<Self> {
        let kb: Self = serde_yaml::from_str(content)?;
        kb.validated()
    }

    /// Parse a JSON document and validate it
    pub fn from_json_str(content: &str) -> ChatResult<Self> {
        let kb: Self = serde_json::from_str(content)?;
        kb.validated()
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> ChatResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(ChatError::UnsupportedFormat(format!(
                "{} (extension {:?})",
                path.display(),
                other.unwrap_or("")
            ))),
        }
    }

    pub fn to_yaml(&self) -> ChatResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> ChatResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check invariants and normalize identifiers and FAQ keywords
    fn validated(mut self) -> ChatResult<Self> {
        if self.tips.is_empty() {
            return Err(ChatError::InvalidKnowledgeBase(
                "tips must not be empty".to_string(),
            ));
        }

        let mut seen = Vec::with_capacity(self.categories.len());
        for category in &self.categories {
            let key = normalize_key(category);
            if key.is_empty() {
                return Err(ChatError::InvalidKnowledgeBase(
                    "category names must not be empty".to_string(),
                ));
            }
            if seen.contains(&key) {
                return Err(ChatError::InvalidKnowledgeBase(format!(
                    "duplicate category: {}",
                    key
                )));
            }
            seen.push(key);
        }
        self.categories = seen;

        let info = std::mem::take(&mut self.category_info);
        for (name, mut entry) in info {
            let key = normalize_key(&name);
            if !self.categories.contains(&key) {
                warn!("Knowledge entry '{}' has no matching category and will be ignored", key);
            }
            if self.category_info.contains_key(&key) {
                return Err(ChatError::InvalidKnowledgeBase(format!(
                    "duplicate category info: {}",
                    key
                )));
            }
            normalize_faq(&mut entry);
            self.category_info.insert(key, entry);
        }

        Ok(self)
    }

    /// Categories in match-priority order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn category_info(&self, category: &str) -> Option<&CategoryInfo> {
        self.category_info.get(category)
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn tips(&self) -> &[String] {
        &self.tips
    }

    /// Safety steps for a category, if any are known
    pub fn steps(&self, category: &str) -> Option<&[String]> {
        self.category_info(category)
            .and_then(|info| info.steps.as_deref())
    }

    /// Answer of the first FAQ entry (in list order) whose keyword occurs
    /// in `normalized_text`
    pub fn faq_answer(&self, category: &str, normalized_text: &str) -> Option<&str> {
        self.category_info(category)?
            .faq
            .iter()
            .find(|entry| normalized_text.contains(entry.keyword.as_str()))
            .map(|entry| entry.answer.as_str())
    }

    /// Uniformly random tip
    pub fn random_tip<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        // tips is non-empty after validation
        self.tips
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn normalize_faq(info: &mut CategoryInfo) {
    for entry in &mut info.faq {
        entry.keyword = normalize_key(&entry.keyword);
    }
    // an empty keyword would match every message
    info.faq.retain(|entry| !entry.keyword.is_empty());
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        let kb = Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            category_info: HashMap::new(),
            templates: Templates {
                greeting: GREETING.to_string(),
                emergency_activation: EMERGENCY_ACTIVATION.to_string(),
                unknown_fallback: UNKNOWN_FALLBACK.to_string(),
                emergency_contacts: EMERGENCY_CONTACTS.to_string(),
            },
            tips: DEFAULT_TIPS.iter().map(|t| t.to_string()).collect(),
        };

        kb.with_category_info(
            "earthquake",
            CategoryInfo::with_steps([
                "Drop to your hands and knees",
                "Cover your head and neck under a sturdy table or desk",
                "Hold on until the shaking stops",
                "Stay away from windows, mirrors and heavy furniture",
                "When the shaking stops, check for injuries and gas leaks before moving",
            ])
            .faq(
                "aftershock",
                "Aftershocks can follow for days or weeks. Drop, Cover and Hold On every time you feel one, and stay out of damaged buildings.",
            )
            .faq(
                "kit",
                "An earthquake kit should hold water (one gallon per person per day), food, a flashlight, a whistle, a first aid kit and sturdy shoes. Checklist: https://www.ready.gov/kit",
            ),
        )
        .with_category_info(
            "tsunami",
            CategoryInfo::with_steps([
                "If you feel a strong earthquake near the coast, move to high ground immediately",
                "Follow marked tsunami evacuation routes inland",
                "Go at least 100 feet above sea level or 2 miles inland",
                "Stay away from the shore until officials give the all-clear",
            ])
            .faq(
                "warning sign",
                "Natural warning signs include strong shaking, a loud roar from the ocean and water receding unusually far. Do not wait for an official alert.",
            )
            .faq(
                "how long",
                "Tsunami waves can keep arriving for 8 hours or more, and the first wave is often not the largest.",
            ),
        )
        .with_category_info(
            "hurricane",
            CategoryInfo::with_steps([
                "Know your evacuation zone and route",
                "Secure windows with storm shutters or plywood",
                "Bring outdoor furniture and loose items inside",
                "Stock at least three days of water, food and medicine",
                "Evacuate when local officials tell you to",
            ])
            .faq(
                "category",
                "Hurricanes are rated 1 to 5 on the Saffir-Simpson scale by wind speed. Even a Category 1 storm can cause dangerous flooding. Details: https://www.nhc.noaa.gov/aboutsshws.php",
            )
            .faq(
                "generator",
                "Only run a generator outdoors, at least 20 feet from windows and doors, to avoid carbon monoxide poisoning.",
            ),
        )
        .with_category_info(
            "wildfire",
            CategoryInfo::with_steps([
                "Sign up for local emergency alerts",
                "Keep a go-bag ready and your vehicle fueled",
                "Close all windows and doors before leaving",
                "Leave early when an evacuation warning is issued",
            ])
            .faq(
                "smoke",
                "Stay indoors with windows closed and use an air purifier or an N95 mask. Air quality updates: https://www.airnow.gov",
            )
            .faq(
                "defensible space",
                "Clear dead plants and debris within 30 feet of your home and keep gutters clean to create defensible space.",
            ),
        )
        .with_category_info(
            "flood",
            CategoryInfo::with_steps([
                "Move to higher ground immediately",
                "Avoid walking or driving through flood waters",
                "Turn off utilities at the main switches if instructed",
                "Stay tuned to local news for updates",
            ])
            .faq(
                "drive",
                "Turn around, don't drown. Just 12 inches of moving water can carry away most cars.",
            )
            .faq(
                "insurance",
                "Standard homeowner policies usually do not cover flooding. Ask about the National Flood Insurance Program at 877-336-2627.",
            ),
        )
    }
}

const DEFAULT_CATEGORIES: [&str; 5] = ["earthquake", "tsunami", "hurricane", "wildfire", "flood"];

const GREETING: &str = "Hello! I'm DisasterBot, your emergency preparedness assistant. I can help with:\
<ul>\
<li>Earthquake safety procedures</li>\
<li>Tsunami evacuation plans</li>\
<li>Hurricane preparedness</li>\
<li>Wildfire danger information</li>\
<li>Flood risk assessment</li>\
</ul>\
<p>Try asking: \"What should I do during an earthquake?\" or \"How do I prepare for a hurricane?\"</p>\
<p>For immediate help, say <strong>\"EMERGENCY\"</strong> followed by your situation.</p>";

const EMERGENCY_ACTIVATION: &str = "🚨 <strong>EMERGENCY ASSISTANCE ACTIVATED</strong> 🚨\
<p>Please describe your situation clearly (example: \"Earthquake happening now\" or \"Flood waters rising\").</p>\
<p>While you wait for my response, here are emergency contacts:</p>\
<ul>\
<li>Police/Fire/Medical: <strong>911</strong></li>\
<li>Coast Guard: <strong>+1-202-372-2100</strong></li>\
<li>FEMA: <strong>1-800-621-3362</strong></li>\
</ul>";

const UNKNOWN_FALLBACK: &str = "I'm not sure I understand. For immediate help, contact local emergency services.\
<p>Here are some things I can help with:</p>\
<ul>\
<li>Safety steps for different disasters</li>\
<li>Preparation checklists</li>\
<li>Emergency contact information</li>\
<li>What to do after a disaster</li>\
</ul>\
<p>Try asking: \"How do I prepare for earthquakes?\" or \"What's in a basic emergency kit?\"</p>";

const EMERGENCY_CONTACTS: &str = "Here are important emergency contacts:\
<ul>\
<li><strong>Medical Emergency:</strong> 911</li>\
<li><strong>Fire Department:</strong> 911</li>\
<li><strong>Police:</strong> 911</li>\
<li><strong>Poison Control:</strong> 1-800-222-1222</li>\
<li><strong>FEMA:</strong> 1-800-621-3362</li>\
<li><strong>Red Cross:</strong> 1-800-RED-CROSS</li>\
</ul>";

const DEFAULT_TIPS: [&str; 5] = [
    "Remember: During any disaster, stay calm and follow official instructions.",
    "Pro tip: Keep your emergency kit in an easily accessible location.",
    "Did you know? You should practice your evacuation route twice a year.",
    "Important: Always have multiple ways to receive emergency alerts.",
    "Safety first: Check your smoke detectors and fire extinguishers regularly.",
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn templates() -> Templates {
        Templates {
            greeting: "hello".to_string(),
            emergency_activation: "alert".to_string(),
            unknown_fallback: "unknown".to_string(),
            emergency_contacts: "contacts".to_string(),
        }
    }

    #[test]
    fn test_default_knowledge_base() {
        let kb = KnowledgeBase::default();
        assert_eq!(
            kb.categories(),
            &["earthquake", "tsunami", "hurricane", "wildfire", "flood"]
        );
        assert_eq!(kb.tips().len(), 5);
        for category in kb.categories() {
            assert!(kb.steps(category).is_some(), "no steps for {}", category);
        }
    }

    #[test]
    fn test_missing_category_info_is_absent() {
        let kb = KnowledgeBase::new(["earthquake", "flood"], templates(), vec!["tip".into()]).unwrap();
        assert!(kb.steps("flood").is_none());
        assert!(kb.faq_answer("flood", "flood insurance").is_none());
        assert!(kb.steps("volcano").is_none());
    }

    #[test]
    fn test_faq_first_entry_wins() {
        let kb = KnowledgeBase::new(["flood"], templates(), vec!["tip".into()])
            .unwrap()
            .with_category_info(
                "flood",
                CategoryInfo::default()
                    .faq("insurance", "first")
                    .faq("flood insurance", "second"),
            );

        assert_eq!(
            kb.faq_answer("flood", "do i need flood insurance"),
            Some("first")
        );
        assert_eq!(kb.faq_answer("flood", "flood level"), None);
    }

    #[test]
    fn test_faq_keywords_are_normalized() {
        let kb = KnowledgeBase::new(["Flood "], templates(), vec!["tip".into()])
            .unwrap()
            .with_category_info(" FLOOD", CategoryInfo::default().faq("  Drive ", "turn around").faq("  ", "never"));

        assert_eq!(kb.categories(), &["flood"]);
        assert_eq!(kb.faq_answer("flood", "can i drive through a flood"), Some("turn around"));
        assert_eq!(kb.faq_answer("flood", "flood"), None);
    }

    #[test]
    fn test_empty_tips_rejected() {
        let err = KnowledgeBase::new(["flood"], templates(), Vec::new()).unwrap_err();
        assert!(matches!(err, ChatError::InvalidKnowledgeBase(_)));
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let err =
            KnowledgeBase::new(["flood", "FLOOD"], templates(), vec!["tip".into()]).unwrap_err();
        assert!(err.to_string().contains("duplicate category"));
    }

    #[test]
    fn test_duplicate_category_info_rejected() {
        let yaml = r#"
categories: [flood]
templates:
  greeting: hi
  emergencyActivation: sos
  unknownFallback: unknown
  emergencyContacts: contacts
tips: [tip]
categoryInfo:
  Flood:
    steps: [Upper-case entry]
  flood:
    steps: [Lower-case entry]
"#;
        let err = KnowledgeBase::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate category info: flood"));
    }

    #[test]
    fn test_random_tip_is_reproducible() {
        let kb = KnowledgeBase::default();
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let tip = kb.random_tip(&mut a);
            assert_eq!(tip, kb.random_tip(&mut b));
            assert!(kb.tips().iter().any(|t| t == tip));
        }
    }

    #[test]
    fn test_load_from_yaml() {
        let yaml = r#"
categories: [Earthquake, flood]
categoryInfo:
  earthquake:
    steps: [Drop, Cover, Hold on]
    faq:
      - keyword: Aftershock
        answer: Expect more.
templates:
  greeting: hi
  emergencyActivation: alert
  unknownFallback: what
  emergencyContacts: call
tips: [Stay calm.]
"#;
        let kb = KnowledgeBase::from_yaml_str(yaml).unwrap();
        assert_eq!(kb.categories(), &["earthquake", "flood"]);
        assert_eq!(kb.steps("earthquake").unwrap().len(), 3);
        assert_eq!(kb.faq_answer("earthquake", "aftershock?"), Some("Expect more."));
        assert!(kb.category_info("flood").is_none());
    }

    #[test]
    fn test_from_file_by_extension() {
        let temp = tempfile::tempdir().unwrap();

        let json_path = temp.path().join("kb.json");
        std::fs::write(&json_path, KnowledgeBase::default().to_json().unwrap()).unwrap();
        let kb = KnowledgeBase::from_file(&json_path).unwrap();
        assert_eq!(kb, KnowledgeBase::default());

        let txt_path = temp.path().join("kb.txt");
        std::fs::write(&txt_path, "categories: []").unwrap();
        assert!(matches!(
            KnowledgeBase::from_file(&txt_path),
            Err(ChatError::UnsupportedFormat(_))
        ));
    }
}
