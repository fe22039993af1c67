//! Fixed reply texts.

use super::payload::{CardSection, ResponsePayload, StyleHints, TextSize};

pub const MORNING_GREETING: &str = "おはようございます！🌅\n今日も素敵な一日になりますように✨\n何かお手伝いできることがあれば、お気軽にどうぞ！";

pub const HELLO: &str =
    "こんにちは！😊\nお疲れさまです。\n今日はどのようなことでお手伝いできますか？";

pub const GOOD_NIGHT: &str = "お疲れさまでした！🌙\nゆっくり休んでくださいね。\nまた明日、お待ちしています💤";

pub const TIRED: &str = "お疲れさまです💪\n無理は禁物ですよ。\n\n少し休憩して、深呼吸してみてください🌸\nあなたのペースで大丈夫です！";

pub const CHEER: &str = "頑張っていらっしゃいますね！👏\n\nでも、無理は禁物です。\n適度に休憩も取ってくださいね😌\n応援しています📣";

pub const THANKS: &str = "どういたしまして！😊\n\nお役に立てて嬉しいです🎉\nまた何かございましたら、いつでもお声がけください！";

pub const ABOUT_BOT: &str = "私はLINE Botです🤖\n\n24時間いつでもお話しできます！\n・挨拶や雑談\n・時間の確認\n・ちょっとした励まし\n\nなんでもお気軽にどうぞ💬";

pub const WEATHER_VARIANTS: [&str; 3] = [
    "今日はいい天気ですね！☀️\n外出日和です。水分補給をお忘れなく！",
    "雨の日もまた素敵ですね🌧️\n読書や室内での時間を楽しみましょう！",
    "曇り空でも心は晴れやか☁️\n素敵な一日をお過ごしください！",
];

pub const DEFAULT_VARIANTS: [&str; 5] = [
    "メッセージありがとうございます！📱\nいつでもお話しできて嬉しいです😊",
    "お話ありがとうございます✨\n何かお手伝いできることがあれば、お気軽にどうぞ！",
    "いつもありがとうございます🙏\n今日も素敵な一日をお過ごしください！",
    "メッセージを受け取りました📩\nお返事いただけて嬉しいです！",
    "お疲れさまです！\n何かご質問があれば、いつでもお聞かせください😊",
];

/// Formats the time reply around an already formatted local timestamp.
pub fn current_time_text(formatted: &str) -> String {
    format!("現在の時刻は\n📅 {formatted} です⏰\n\n時間を有効活用していきましょう！")
}

/// Weekday morning broadcast.
pub const WEEKDAY_MORNING_BROADCAST: &str = "🌅 おはようございます！\n\n新しい一日の始まりです。\n今日も素敵な一日になりますように✨\n\n何かお手伝いできることがあれば、いつでもお声がけください！";

/// Friday evening broadcast.
pub const FRIDAY_EVENING_BROADCAST: &str = "🎉 金曜日お疲れさまでした！\n\n今週もよく頑張りました👏\n素敵な週末をお過ごしください。\n\nまた来週、お待ちしています！";

const HELP_FEATURES: &str = "🌅 挨拶（おはよう、こんにちは）\n⏰ 時間確認（時間、何時）\n☀️ 天気の話（天気、weather）\n💪 励まし（疲れた、頑張る）\n❓ ヘルプ（help、使い方）";

/// The usage guide card.
pub fn help_card() -> ResponsePayload {
    ResponsePayload::RichCard {
        alt_text: "ボットの使い方ガイド".into(),
        title: "使い方ガイド".into(),
        title_style: StyleHints::default()
            .bold()
            .size(TextSize::Xl)
            .color("#1DB446"),
        sections: vec![
            CardSection::new(
                "私にできること",
                StyleHints::default().bold().margin(TextSize::Md),
            ),
            CardSection::new(
                HELP_FEATURES,
                StyleHints::default()
                    .wrap()
                    .margin(TextSize::Md)
                    .size(TextSize::Sm),
            ),
            CardSection::new(
                "何でもお気軽にお話しください！",
                StyleHints::default()
                    .margin(TextSize::Md)
                    .size(TextSize::Sm)
                    .color("#666666"),
            ),
        ],
    }
}
