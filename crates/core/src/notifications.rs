//! Notification preferences.
//!
//! Three channels of boolean flags. Everything defaults to on, and a stored
//! document missing a flag (older rows) falls back to on as well.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from preference updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// The channel does not carry this kind of notification.
    #[error("{kind} notifications are not available over {channel}")]
    UnsupportedPreference {
        channel: Channel,
        kind: NotificationKind,
    },
}

/// Delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Push,
    Sms,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Email => "email",
            Self::Push => "push",
            Self::Sms => "sms",
        })
    }
}

/// What the notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderUpdates,
    Promotions,
    SecurityAlerts,
    Newsletter,
    PriceAlerts,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::OrderUpdates => "order update",
            Self::Promotions => "promotion",
            Self::SecurityAlerts => "security alert",
            Self::Newsletter => "newsletter",
            Self::PriceAlerts => "price alert",
        })
    }
}

const fn on() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailPreferences {
    #[serde(default = "on")]
    pub order_updates: bool,
    #[serde(default = "on")]
    pub promotions: bool,
    #[serde(default = "on")]
    pub security_alerts: bool,
    #[serde(default = "on")]
    pub newsletter: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPreferences {
    #[serde(default = "on")]
    pub order_updates: bool,
    #[serde(default = "on")]
    pub promotions: bool,
    #[serde(default = "on")]
    pub security_alerts: bool,
    #[serde(default = "on")]
    pub price_alerts: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsPreferences {
    #[serde(default = "on")]
    pub order_updates: bool,
    #[serde(default = "on")]
    pub promotions: bool,
    #[serde(default = "on")]
    pub security_alerts: bool,
}

impl Default for EmailPreferences {
    fn default() -> Self {
        Self {
            order_updates: true,
            promotions: true,
            security_alerts: true,
            newsletter: true,
        }
    }
}

impl Default for PushPreferences {
    fn default() -> Self {
        Self {
            order_updates: true,
            promotions: true,
            security_alerts: true,
            price_alerts: true,
        }
    }
}

impl Default for SmsPreferences {
    fn default() -> Self {
        Self {
            order_updates: true,
            promotions: true,
            security_alerts: true,
        }
    }
}

/// A shopper's full notification preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub email: EmailPreferences,
    #[serde(default)]
    pub push: PushPreferences,
    #[serde(default)]
    pub sms: SmsPreferences,
}

impl NotificationSettings {
    fn flag_mut(
        &mut self,
        channel: Channel,
        kind: NotificationKind,
    ) -> Result<&mut bool, NotificationError> {
        use NotificationKind as K;

        let flag = match (channel, kind) {
            (Channel::Email, K::OrderUpdates) => &mut self.email.order_updates,
            (Channel::Email, K::Promotions) => &mut self.email.promotions,
            (Channel::Email, K::SecurityAlerts) => &mut self.email.security_alerts,
            (Channel::Email, K::Newsletter) => &mut self.email.newsletter,
            (Channel::Push, K::OrderUpdates) => &mut self.push.order_updates,
            (Channel::Push, K::Promotions) => &mut self.push.promotions,
            (Channel::Push, K::SecurityAlerts) => &mut self.push.security_alerts,
            (Channel::Push, K::PriceAlerts) => &mut self.push.price_alerts,
            (Channel::Sms, K::OrderUpdates) => &mut self.sms.order_updates,
            (Channel::Sms, K::Promotions) => &mut self.sms.promotions,
            (Channel::Sms, K::SecurityAlerts) => &mut self.sms.security_alerts,
            _ => return Err(NotificationError::UnsupportedPreference { channel, kind }),
        };
        Ok(flag)
    }

    /// Read one flag.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::UnsupportedPreference`] for pairs that do
    /// not exist, such as SMS newsletters.
    pub fn get(&self, channel: Channel, kind: NotificationKind) -> Result<bool, NotificationError> {
        let mut copy = *self;
        copy.flag_mut(channel, kind).map(|flag| *flag)
    }

    /// Flip one flag and return its new value.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::UnsupportedPreference`] for pairs that do
    /// not exist.
    pub fn toggle(
        &mut self,
        channel: Channel,
        kind: NotificationKind,
    ) -> Result<bool, NotificationError> {
        let flag = self.flag_mut(channel, kind)?;
        *flag = !*flag;
        Ok(*flag)
    }
}
