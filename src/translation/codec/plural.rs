//! gettext `Plural-Forms` expressions per language.

/// Default rule for languages that are not listed.
const DEFAULT_RULE: &str = "nplurals=2; plural=(n != 1);";

/// Returns the `Plural-Forms` header value for a language code.
///
/// Region and script suffixes are ignored: `pt_BR`, `pt-BR` and `pt` share
/// a rule.
pub fn plural_forms(language: &str) -> &'static str {
    let language = language.replace('-', "_");
    let primary = language.split('_').next().unwrap_or_default();

    match primary {
        "bo" | "dz" | "id" | "ja" | "ka" | "km" | "ko" | "ms" | "th" | "vi" | "zh" => {
            "nplurals=1; plural=0;"
        }

        "az" | "af" | "bn" | "bg" | "ca" | "da" | "de" | "el" | "en" | "eo" | "es" | "et"
        | "eu" | "fi" | "fo" | "fur" | "fy" | "gl" | "gu" | "ha" | "he" | "hu" | "it" | "kn"
        | "ku" | "lb" | "ml" | "mn" | "mr" | "nah" | "nb" | "ne" | "nl" | "nn" | "no" | "om"
        | "or" | "pa" | "pap" | "ps" | "pt" | "so" | "sq" | "sv" | "sw" | "ta" | "te" | "tk"
        | "ur" | "zu" | "bh" | "hi" | "hy" | "nso" | "xbr" => DEFAULT_RULE,

        "tr" | "fa" | "am" | "fil" | "fr" | "gun" | "ln" | "mg" | "ti" | "wa" => {
            "nplurals=2; plural=(n > 1);"
        }

        "jv" => "nplurals=2; plural=(n != 0);",
        "is" => "nplurals=2; plural=(n%10!=1 || n%100==11);",
        "mk" => "nplurals=2; plural=(n==1 || n%10==1) ? 0 : 1;",
        "be" | "bs" | "hr" | "ru" | "sr" | "uk" => {
            "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);"
        }
        "cs" | "sk" => "nplurals=3; plural=(n==1) ? 0 : (n>=2 && n<=4) ? 1 : 2;",
        "lt" => {
            "nplurals=3; plural=(n%10==1 && n%100!=11) ? 0 : (n%10>=2 && (n%100<10 || n%100>=20)) ? 1 : 2;"
        }
        "lv" => "nplurals=3; plural=(n%10==1 && n%100!=11) ? 0 : (n!=0) ? 1 : 2;",
        "pl" => {
            "nplurals=3; plural=(n==1) ? 0 : (n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20)) ? 1 : 2;"
        }
        "ro" => "nplurals=3; plural=(n==1) ? 0 : (n==0 || (n%100>0 && n%100<20)) ? 1 : 2;",
        "sl" => "nplurals=4; plural=(n%100==1) ? 0 : (n%100==2) ? 1 : (n%100==3 || n%100==4) ? 2 : 3;",
        "mt" => {
            "nplurals=4; plural=(n==1) ? 0 : (n==0 || (n%100>1 && n%100<11)) ? 1 : (n%100>10 && n%100<20) ? 2 : 3;"
        }
        "cy" => "nplurals=4; plural=(n==1) ? 0 : (n==2) ? 1 : (n!=8 && n!=11) ? 2 : 3;",
        "ga" => "nplurals=5; plural=n==1 ? 0 : n==2 ? 1 : (n>2 && n<7) ? 2 :(n>6 && n<11) ? 3 : 4;",
        "ar" => {
            "nplurals=6; plural=(n==0) ? 0 : (n==1) ? 1 : (n==2) ? 2 : (n%100>=3 && n%100<=10) ? 3 : (n%100>=11 && n%100<=99) ? 4 : 5;"
        }

        _ => DEFAULT_RULE,
    }
}
