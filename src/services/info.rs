// ABOUTME: Info-mode responder answering questions about the camp programme from static YAML content
// ABOUTME: Detects Thai or English and routes by keyword to overview, career, registration, contact, location or schedule
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt::Write;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::intelligence::text::contains_thai;
use crate::models::Language;

const CAREER_KEYWORDS: &[&str] = &["career", "เส้นทาง", "หมอ", "medical school"];
const REGISTER_KEYWORDS: &[&str] = &["register", "สมัคร", "ลงทะเบียน"];
const CONTACT_KEYWORDS: &[&str] = &["contact", "ติดต่อ", "โทร"];
const LOCATION_KEYWORDS: &[&str] = &["location", "สถานที่", "ที่ไหน"];
const DATE_KEYWORDS: &[&str] = &["date", "วันที่", "เมื่อไหร่", "timeline"];

const CAREER_CATEGORY: &str = "career_camp";

const NO_INFO_TH: &str = "ขออภัยครับ ขณะนี้ยังไม่มีข้อมูลค่ายที่เปิดให้บริการ กรุณาติดต่อสอบถามโดยตรงที่โรงพยาบาลศิริราช หรือติดตามข่าวสารผ่านช่องทางต่างๆ ของโรงพยาบาลครับ";
const NO_INFO_EN: &str = "Sorry, there is currently no camp information available. Please contact Siriraj Hospital directly or follow updates through the hospital's channels.";
const NO_CAREER_CAMP_TH: &str =
    "ขออภัยครับ ขณะนี้ยังไม่มีค่ายเส้นทางสู่หมอศิริราชที่เปิดให้บริการ กรุณาติดต่อสอบถามโดยตรงที่คณะแพทยศาสตร์ศิริราชพยาบาล";
const NO_CAREER_CAMP_EN: &str = "Sorry, there is currently no Medical Career Path Camp available. Please contact the Faculty of Medicine Siriraj Hospital directly.";

/// Question category inferred from keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoTopic {
    /// Career camp details
    Career,
    /// How to register
    Registration,
    /// Phone, email, website
    Contact,
    /// Venue and directions
    Location,
    /// Dates and timeline
    Schedule,
    /// General overview
    Overview,
}

impl InfoTopic {
    /// First matching category, in priority order
    #[must_use]
    pub fn detect(message: &str) -> Self {
        let lower = message.to_lowercase();
        let has = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));
        if has(CAREER_KEYWORDS) {
            Self::Career
        } else if has(REGISTER_KEYWORDS) {
            Self::Registration
        } else if has(CONTACT_KEYWORDS) {
            Self::Contact
        } else if has(LOCATION_KEYWORDS) {
            Self::Location
        } else if has(DATE_KEYWORDS) {
            Self::Schedule
        } else {
            Self::Overview
        }
    }
}

/// Reply language: Thai when the message has any Thai character
#[must_use]
pub fn detect_language(message: &str) -> Language {
    if contains_thai(message) {
        Language::Thai
    } else {
        Language::English
    }
}

/// Programme-wide details
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramInfo {
    /// Programme title
    pub title: String,
    /// Programme title (English)
    pub title_en: String,
    /// Opening paragraph
    pub intro: String,
    /// Opening paragraph (English)
    pub intro_en: String,
    /// Participant capacity
    pub capacity: String,
    /// Participant capacity (English)
    pub capacity_en: String,
    /// Participation fee
    pub fee: String,
    /// Participation fee (English)
    pub fee_en: String,
    /// General phone number
    pub phone: String,
    /// General email
    pub email: String,
    /// Online registration address
    pub registration_url: String,
    /// General website
    pub website: String,
    /// How to get there
    #[serde(default)]
    pub directions: Vec<String>,
    /// How to get there (English)
    #[serde(default)]
    pub directions_en: Vec<String>,
    /// Notes appended to schedule answers
    #[serde(default)]
    pub schedule_notes: Vec<String>,
    /// Notes appended to schedule answers (English)
    #[serde(default)]
    pub schedule_notes_en: Vec<String>,
}

/// Contact channels of one camp
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampContact {
    /// Phone
    pub phone: String,
    /// Email
    pub email: String,
    /// Website
    #[serde(default)]
    pub website: Option<String>,
}

/// One camp, each text field in Thai and English
#[derive(Debug, Clone, Deserialize)]
pub struct CampRecord {
    /// Title
    pub title: String,
    /// Title (English)
    pub title_en: String,
    /// Category label, e.g. `career_camp`
    pub category: String,
    /// Hidden when false
    #[serde(default = "default_active")]
    pub active: bool,
    /// Description
    pub description: String,
    /// Description (English)
    pub description_en: String,
    /// Date
    pub date: String,
    /// Date (English)
    pub date_en: String,
    /// Venue
    pub location: String,
    /// Venue (English)
    pub location_en: String,
    /// Organizer
    pub organizer: String,
    /// Organizer (English)
    pub organizer_en: String,
    /// Contact channels
    pub contact: CampContact,
    /// Activities
    #[serde(default)]
    pub activities: Vec<String>,
    /// Activities (English)
    #[serde(default)]
    pub activities_en: Vec<String>,
    /// Eligibility
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Eligibility (English)
    #[serde(default)]
    pub requirements_en: Vec<String>,
    /// Registration instructions
    pub registration_info: String,
    /// Registration instructions (English)
    pub registration_info_en: String,
    /// Benefits
    #[serde(default)]
    pub benefits: Vec<String>,
    /// Benefits (English)
    #[serde(default)]
    pub benefits_en: Vec<String>,
    /// Application timeline
    #[serde(default)]
    pub timeline: Vec<String>,
    /// Application timeline (English)
    #[serde(default)]
    pub timeline_en: Vec<String>,
}

const fn default_active() -> bool {
    true
}

/// Whole info document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InfoContent {
    /// Programme details
    #[serde(default)]
    pub program: ProgramInfo,
    /// Camps, inactive ones included
    #[serde(default)]
    pub camps: Vec<CampRecord>,
}

/// Answers info-mode questions
#[derive(Debug, Clone, Default)]
pub struct InfoResponder {
    content: InfoContent,
}

/// Thai or English variant of a text pair
fn pick<'a>(language: Language, thai: &'a str, english: &'a str) -> &'a str {
    if language == Language::Thai {
        thai
    } else {
        english
    }
}

fn numbered(out: &mut String, items: &[String]) {
    for (index, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{}. {item}", index + 1);
    }
}

impl InfoResponder {
    /// Responder over parsed content
    #[must_use]
    pub const fn new(content: InfoContent) -> Self {
        Self { content }
    }

    /// Parse a YAML document
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` for malformed YAML
    pub fn from_yaml(document: &str) -> AppResult<Self> {
        let content: InfoContent = serde_yaml::from_str(document).map_err(|e| {
            AppError::new(ErrorCode::InvalidFormat, format!("Invalid info content: {e}"))
        })?;
        Ok(Self::new(content))
    }

    /// Load a YAML file
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file cannot be read, or `InvalidFormat`
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let document = fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCode::StorageError,
                format!("Failed to read info content {}: {e}", path.display()),
            )
        })?;
        let responder = Self::from_yaml(&document)?;
        info!(
            path = %path.display(),
            camps = responder.content.camps.len(),
            "Loaded info content"
        );
        Ok(responder)
    }

    fn active_camps(&self) -> Vec<&CampRecord> {
        self.content.camps.iter().filter(|camp| camp.active).collect()
    }

    /// Answer `message` in its language
    #[must_use]
    pub fn respond(&self, message: &str) -> String {
        let language = detect_language(message);
        let camps = self.active_camps();
        if camps.is_empty() {
            return pick(language, NO_INFO_TH, NO_INFO_EN).to_owned();
        }

        let topic = InfoTopic::detect(message);
        debug!(?topic, ?language, "Info question routed");
        match topic {
            InfoTopic::Career => self.career(&camps, language),
            InfoTopic::Registration => self.registration(&camps, language),
            InfoTopic::Contact => self.contact(&camps, language),
            InfoTopic::Location => self.location(&camps, language),
            InfoTopic::Schedule => self.schedule(&camps, language),
            InfoTopic::Overview => self.overview(&camps, language),
        }
    }

    fn overview(&self, camps: &[&CampRecord], lang: Language) -> String {
        let p = &self.content.program;
        let mut out = format!(
            "🏥 **{}**\n\n{}\n\n",
            pick(lang, &p.title, &p.title_en),
            pick(lang, &p.intro, &p.intro_en)
        );
        if let Some(camp) = camps.iter().find(|c| c.category == CAREER_CATEGORY) {
            let _ = write!(
                out,
                "📚 **{}**\n📅 {}: {}\n📍 {}: {}\n👥 {}: {}\n💰 {}: {}\n\n",
                pick(lang, &camp.title, &camp.title_en),
                pick(lang, "วันที่", "Date"),
                pick(lang, &camp.date, &camp.date_en),
                pick(lang, "สถานที่", "Location"),
                pick(lang, &camp.location, &camp.location_en),
                pick(lang, "จำนวนที่รับ", "Capacity"),
                pick(lang, &p.capacity, &p.capacity_en),
                pick(lang, "ค่าใช้จ่าย", "Fee"),
                pick(lang, &p.fee, &p.fee_en),
            );
        }
        let _ = write!(
            out,
            "{}\n📞 {}: {}\n🌐 {}: {}",
            pick(
                lang,
                "สำหรับข้อมูลเพิ่มเติมหรือการลงทะเบียน กรุณาติดต่อ:",
                "For more information or registration, please contact:"
            ),
            pick(lang, "โทร", "Phone"),
            p.phone,
            pick(lang, "เว็บไซต์", "Website"),
            p.registration_url
        );
        out
    }

    fn career(&self, camps: &[&CampRecord], lang: Language) -> String {
        let Some(camp) = camps.iter().find(|c| c.category == CAREER_CATEGORY) else {
            return pick(lang, NO_CAREER_CAMP_TH, NO_CAREER_CAMP_EN).to_owned();
        };
        let p = &self.content.program;
        let mut out = format!(
            "📚 **{}**\n\n{}\n\n📅 **{}**: {}\n📍 **{}**: {}\n🏥 **{}**: {}\n\n",
            pick(lang, &p.title, &p.title_en),
            pick(lang, &camp.description, &camp.description_en),
            pick(lang, "วันที่", "Date"),
            pick(lang, &camp.date, &camp.date_en),
            pick(lang, "สถานที่", "Location"),
            pick(lang, &camp.location, &camp.location_en),
            pick(lang, "จัดโดย", "Organized by"),
            pick(lang, &camp.organizer, &camp.organizer_en),
        );

        let sections: [(&str, &str, &[String], &[String]); 2] = [
            ("🎯 **กิจกรรมที่ได้รับ**", "🎯 **Activities**", &camp.activities, &camp.activities_en),
            ("📋 **คุณสมบัติผู้สมัคร**", "📋 **Requirements**", &camp.requirements, &camp.requirements_en),
        ];
        for (thai, english, items_th, items_en) in sections {
            let _ = writeln!(out, "{}:", pick(lang, thai, english));
            numbered(&mut out, if lang == Language::Thai { items_th } else { items_en });
            out.push('\n');
        }

        let _ = write!(
            out,
            "📝 **{}**: {}\n\n",
            pick(lang, "การลงทะเบียน", "Registration"),
            pick(lang, &camp.registration_info, &camp.registration_info_en)
        );

        let _ = writeln!(out, "{}:", pick(lang, "✅ **ประโยชน์ที่ได้รับ**", "✅ **Benefits**"));
        numbered(&mut out, if lang == Language::Thai { &camp.benefits } else { &camp.benefits_en });
        let _ = writeln!(out, "\n{}:", pick(lang, "📅 **ไทม์ไลน์**", "📅 **Timeline**"));
        numbered(&mut out, if lang == Language::Thai { &camp.timeline } else { &camp.timeline_en });

        let _ = write!(
            out,
            "\n📞 **{}**:\n{}: {}\n{}: {}",
            pick(lang, "ติดต่อสอบถาม", "Contact"),
            pick(lang, "โทร", "Phone"),
            camp.contact.phone,
            pick(lang, "อีเมล", "Email"),
            camp.contact.email
        );
        out
    }

    fn registration(&self, camps: &[&CampRecord], lang: Language) -> String {
        let p = &self.content.program;
        let mut out = format!(
            "📝 **{} {}**\n\n",
            pick(lang, "วิธีการลงทะเบียน", "Registration Process for"),
            pick(lang, &p.title, &p.title_en)
        );
        for (index, camp) in camps.iter().enumerate() {
            let _ = write!(
                out,
                "{}. **{}**\n   📅 {}: {}\n   📝 {}\n   📞 {}: {}\n\n",
                index + 1,
                pick(lang, &camp.title, &camp.title_en),
                pick(lang, "วันที่", "Date"),
                pick(lang, &camp.date, &camp.date_en),
                pick(lang, &camp.registration_info, &camp.registration_info_en),
                pick(lang, "โทร", "Phone"),
                camp.contact.phone
            );
        }
        let _ = write!(
            out,
            "🌐 **{}**: {}\n📧 **{}**: {}",
            pick(lang, "ลงทะเบียนออนไลน์", "Online Registration"),
            p.registration_url,
            pick(lang, "อีเมล", "Email"),
            p.email
        );
        out
    }

    fn contact(&self, camps: &[&CampRecord], lang: Language) -> String {
        let p = &self.content.program;
        let mut out = format!(
            "📞 **{} {}**\n\n",
            pick(lang, "ข้อมูลการติดต่อ", "Contact Information for"),
            pick(lang, &p.title, &p.title_en)
        );
        for (index, camp) in camps.iter().enumerate() {
            let _ = write!(
                out,
                "{}. **{}**\n   📞 {}: {}\n   📧 {}: {}\n",
                index + 1,
                pick(lang, &camp.title, &camp.title_en),
                pick(lang, "โทร", "Phone"),
                camp.contact.phone,
                pick(lang, "อีเมล", "Email"),
                camp.contact.email
            );
            if let Some(website) = &camp.contact.website {
                let _ = writeln!(out, "   🌐 {}: {website}", pick(lang, "เว็บไซต์", "Website"));
            }
            out.push('\n');
        }
        let _ = write!(
            out,
            "🏥 **{}**:\n📞 {}: {}\n🌐 {}: {}",
            pick(lang, "ติดต่อทั่วไป", "General Contact"),
            pick(lang, "โทร", "Phone"),
            p.phone,
            pick(lang, "เว็บไซต์", "Website"),
            p.website
        );
        out
    }

    fn location(&self, camps: &[&CampRecord], lang: Language) -> String {
        let p = &self.content.program;
        let mut out = format!(
            "📍 **{} {}**\n\n",
            pick(lang, "สถานที่จัด", "Location of"),
            pick(lang, &p.title, &p.title_en)
        );
        for (index, camp) in camps.iter().enumerate() {
            let _ = write!(
                out,
                "{}. **{}**\n   📍 {}\n   📅 {}: {}\n\n",
                index + 1,
                pick(lang, &camp.title, &camp.title_en),
                pick(lang, &camp.location, &camp.location_en),
                pick(lang, "วันที่", "Date"),
                pick(lang, &camp.date, &camp.date_en)
            );
        }
        let _ = writeln!(out, "🗺️ **{}**:", pick(lang, "แผนที่", "Map"));
        let directions = if lang == Language::Thai {
            &p.directions
        } else {
            &p.directions_en
        };
        out.push_str(&directions.join("\n"));
        out
    }

    fn schedule(&self, camps: &[&CampRecord], lang: Language) -> String {
        let p = &self.content.program;
        let mut out = format!(
            "📅 **{} {}**\n\n",
            pick(lang, "ตารางเวลา", "Schedule for"),
            pick(lang, &p.title, &p.title_en)
        );
        for (index, camp) in camps.iter().enumerate() {
            let _ = write!(
                out,
                "{}. **{}**\n   📅 {}: {}\n   📍 {}: {}\n\n",
                index + 1,
                pick(lang, &camp.title, &camp.title_en),
                pick(lang, "วันที่", "Date"),
                pick(lang, &camp.date, &camp.date_en),
                pick(lang, "สถานที่", "Location"),
                pick(lang, &camp.location, &camp.location_en)
            );
        }
        if let Some(first) = camps.first() {
            let timeline = if lang == Language::Thai {
                &first.timeline
            } else {
                &first.timeline_en
            };
            if !timeline.is_empty() {
                let _ = writeln!(
                    out,
                    "📅 **{}**:",
                    pick(lang, "ไทม์ไลน์การสมัคร", "Application Timeline")
                );
                numbered(&mut out, timeline);
            }
        }
        let notes = if lang == Language::Thai {
            &p.schedule_notes
        } else {
            &p.schedule_notes_en
        };
        let _ = writeln!(out, "\n📝 **{}**:", pick(lang, "หมายเหตุ", "Notes"));
        let bullets: Vec<String> = notes.iter().map(|note| format!("• {note}")).collect();
        out.push_str(&bullets.join("\n"));
        out
    }
}
