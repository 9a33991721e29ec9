//! SSML 构造
//!
//! 按服务端要求生成单行 SSML 信封

use super::speech::SpeechConfig;

/// 把已转义的文本包进 SSML 信封
///
/// `xml:lang` 固定为 `en-US`：服务端只接受这个值，与音色 locale 无关
pub fn build_ssml(config: &SpeechConfig, escaped_text: &str) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='en-US'>\
         <voice name='{}'>\
         <prosody pitch='{}' rate='{}' volume='{}'>{}</prosody>\
         </voice></speak>",
        config.voice, config.pitch, config.rate, config.volume, escaped_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_ssml_exact_envelope() {
        let mut config = SpeechConfig::new("zh-CN-XiaoxiaoNeural");
        config.validate_and_normalize().unwrap();

        let ssml = build_ssml(&config, "hello");
        assert_eq!(
            ssml,
            "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='en-US'>\
             <voice name='Microsoft Server Speech Text to Speech Voice (zh-CN, XiaoxiaoNeural)'>\
             <prosody pitch='+0Hz' rate='+0%' volume='+0%'>hello</prosody>\
             </voice></speak>"
        );
    }

    #[test]
    fn test_build_ssml_is_single_line() {
        let config = SpeechConfig::default();
        let ssml = build_ssml(&config, "a\nb");
        // 信封本身不引入额外空白
        assert!(!ssml.contains(">\n<"));
        assert!(ssml.starts_with("<speak version='1.0'"));
        assert!(ssml.ends_with("</prosody></voice></speak>"));
    }
}
