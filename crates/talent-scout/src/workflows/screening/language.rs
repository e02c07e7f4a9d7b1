//! Session language: keyword detection and the localized phrase table used for the
//! assistant's fixed prompts.

use serde::{Deserialize, Serialize};

use super::domain::FieldKind;

/// Languages with a full phrase table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
}

const MARKERS: [(Language, &[&str]); 3] = [
    (
        Language::Spanish,
        &["hola", "gracias", "por favor", "buenos días", "buenos dias", "español"],
    ),
    (
        Language::French,
        &["bonjour", "merci", "salut", "je suis", "français", "oui"],
    ),
    (
        Language::German,
        &["hallo", "danke", "guten tag", "ich bin", "deutsch", "bitte"],
    ),
];

impl Language {
    /// Accepts an ISO 639-1 code or the English language name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Self::English),
            "es" | "spanish" => Some(Self::Spanish),
            "fr" | "french" => Some(Self::French),
            "de" | "german" => Some(Self::German),
            _ => None,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
        }
    }

    /// Non-English language whose marker words appear in `text`, matched on whole words.
    pub fn detect(text: &str) -> Option<Self> {
        let words: Vec<String> = text
            .split(|ch: char| !ch.is_alphabetic())
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect();
        if words.is_empty() {
            return None;
        }
        let padded = format!(" {} ", words.join(" "));

        MARKERS.iter().find_map(|(language, markers)| {
            markers
                .iter()
                .any(|marker| padded.contains(&format!(" {marker} ")))
                .then_some(*language)
        })
    }

    pub const fn welcome(self) -> &'static str {
        match self {
            Language::English => "I'm the TalentScout hiring assistant. I'll collect a few details about you and then ask some technical questions about your tech stack. Type 'exit' at any time to leave or 'reset' to start over. Say hello when you're ready!",
            Language::Spanish => "¡Bienvenido a TalentScout! Soy tu asistente de contratación y te ayudaré con el proceso de selección inicial. Escribe 'exit' para salir o 'reset' para empezar de nuevo. ¡Saluda cuando estés listo!",
            Language::French => "Bienvenue chez TalentScout ! Je suis votre assistant de recrutement et je vais vous aider avec la sélection initiale. Tapez 'exit' pour quitter ou 'reset' pour recommencer. Dites bonjour quand vous êtes prêt !",
            Language::German => "Willkommen bei TalentScout! Ich bin Ihr Recruiting-Assistent und helfe Ihnen beim ersten Auswahlverfahren. Tippen Sie 'exit' zum Beenden oder 'reset' für einen Neustart. Sagen Sie hallo, wenn Sie bereit sind!",
        }
    }

    pub const fn begin(self) -> &'static str {
        match self {
            Language::English => "Great, let's begin.",
            Language::Spanish => "¡Perfecto, empecemos!",
            Language::French => "Parfait, commençons !",
            Language::German => "Prima, fangen wir an!",
        }
    }

    pub const fn prompt(self, field: FieldKind) -> &'static str {
        match (self, field) {
            (Language::English, FieldKind::FullName) => "Could you please tell me your full name?",
            (Language::English, FieldKind::Email) => "What's your email address?",
            (Language::English, FieldKind::Phone) => "What's the best phone number to reach you?",
            (Language::English, FieldKind::Experience) => {
                "How many years of professional experience do you have?"
            }
            (Language::English, FieldKind::Position) => "Which position are you applying for?",
            (Language::English, FieldKind::Location) => "Where are you currently located?",
            (Language::English, FieldKind::TechStack) => {
                "Please list the technologies you work with (languages, frameworks, databases, tools), separated by commas."
            }
            (Language::Spanish, FieldKind::FullName) => "¿Podrías decirme tu nombre completo?",
            (Language::Spanish, FieldKind::Email) => {
                "¿Podrías proporcionar tu dirección de correo electrónico?"
            }
            (Language::Spanish, FieldKind::Phone) => {
                "¿Cuál es el mejor número de teléfono para contactarte?"
            }
            (Language::Spanish, FieldKind::Experience) => {
                "¿Cuántos años de experiencia profesional tienes?"
            }
            (Language::Spanish, FieldKind::Position) => "¿En qué puesto estás interesado?",
            (Language::Spanish, FieldKind::Location) => "¿Cuál es tu ubicación actual?",
            (Language::Spanish, FieldKind::TechStack) => {
                "Por favor, enumera las tecnologías que dominas (lenguajes, frameworks, bases de datos, herramientas), separadas por comas."
            }
            (Language::French, FieldKind::FullName) => "Pourriez-vous me dire votre nom complet ?",
            (Language::French, FieldKind::Email) => "Pourriez-vous fournir votre adresse e-mail ?",
            (Language::French, FieldKind::Phone) => {
                "Quel est le meilleur numéro de téléphone pour vous joindre ?"
            }
            (Language::French, FieldKind::Experience) => {
                "Combien d'années d'expérience professionnelle avez-vous ?"
            }
            (Language::French, FieldKind::Position) => "Quel poste vous intéresse ?",
            (Language::French, FieldKind::Location) => "Quelle est votre localisation actuelle ?",
            (Language::French, FieldKind::TechStack) => {
                "Veuillez énumérer les technologies que vous maîtrisez (langages, frameworks, bases de données, outils), séparées par des virgules."
            }
            (Language::German, FieldKind::FullName) => {
                "Könnten Sie mir bitte Ihren vollständigen Namen nennen?"
            }
            (Language::German, FieldKind::Email) => {
                "Könnten Sie bitte Ihre E-Mail-Adresse angeben?"
            }
            (Language::German, FieldKind::Phone) => {
                "Unter welcher Telefonnummer sind Sie am besten erreichbar?"
            }
            (Language::German, FieldKind::Experience) => {
                "Wie viele Jahre Berufserfahrung haben Sie?"
            }
            (Language::German, FieldKind::Position) => {
                "Für welche Position interessieren Sie sich?"
            }
            (Language::German, FieldKind::Location) => "Wo befinden Sie sich derzeit?",
            (Language::German, FieldKind::TechStack) => {
                "Bitte listen Sie die Technologien auf, die Sie beherrschen (Sprachen, Frameworks, Datenbanken, Tools), durch Kommas getrennt."
            }
        }
    }

    /// Lead-in before the first technical question.
    pub fn technical_intro(self, tech_stack: &[String]) -> String {
        let stack = tech_stack.join(", ");
        match self {
            Language::English => format!(
                "Thanks! I see you work with {stack}. I'll ask a few technical questions about each."
            ),
            Language::Spanish => format!(
                "¡Gracias! Veo que trabajas con {stack}. Aquí tienes algunas preguntas técnicas sobre cada una."
            ),
            Language::French => format!(
                "Merci ! Je vois que vous travaillez avec {stack}. Voici quelques questions techniques sur chacune."
            ),
            Language::German => format!(
                "Danke! Sie arbeiten mit {stack}. Hier sind einige technische Fragen zu jeder Technologie."
            ),
        }
    }

    pub const fn submitted(self) -> &'static str {
        match self {
            Language::English => "Your application has been submitted.",
            Language::Spanish => "¡Gracias por completar la selección inicial! Tu solicitud ha sido enviada.",
            Language::French => "Merci d'avoir complété la sélection initiale ! Votre candidature a été envoyée.",
            Language::German => "Vielen Dank für das Abschließen der ersten Auswahl! Ihre Bewerbung wurde übermittelt.",
        }
    }

    pub const fn goodbye(self) -> &'static str {
        match self {
            Language::English => "Thank you for your time! Our team will review your information and get back to you soon.",
            Language::Spanish => "¡Gracias por tu tiempo! Nuestro equipo revisará tu información y se pondrá en contacto contigo pronto.",
            Language::French => "Merci pour votre temps ! Notre équipe examinera vos informations et vous recontactera bientôt.",
            Language::German => "Vielen Dank für Ihre Zeit! Unser Team wird Ihre Informationen prüfen und sich bald bei Ihnen melden.",
        }
    }
}
